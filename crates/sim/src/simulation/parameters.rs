//! Model parameters for single-locus simulations.

use crate::errors::ParameterError;
use crate::evolution::mutation::check_rate;
use crate::evolution::{
    Dfe, GeneticValue, MutationModel, RecombinationMap, Region, SelectedRegion,
};
use serde::{Deserialize, Serialize};

/// Mean selection coefficient of the gamma DFE used by [`ModelParams::scaled`].
pub const SCALED_DFE_MEAN: f64 = -0.05;
/// Shape of the gamma DFE used by [`ModelParams::scaled`].
pub const SCALED_DFE_SHAPE: f64 = 0.3;
/// Fraction of `theta` assigned to neutral mutations by [`ModelParams::scaled`].
pub const SCALED_NEUTRAL_FRACTION: f64 = 11.0 / 12.0;

/// Everything needed to evolve a population through one demographic phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Population size in each generation; its length is the number of
    /// generations to run.
    pub demography: Vec<u32>,
    pub neutral_regions: Vec<Region>,
    pub selected_regions: Vec<SelectedRegion>,
    pub recombination_regions: Vec<Region>,
    /// Neutral mutation rate per gamete per generation.
    pub mutation_rate_neutral: f64,
    /// Selected mutation rate per gamete per generation.
    pub mutation_rate_selected: f64,
    /// Expected crossovers per meiosis.
    pub recombination_rate: f64,
    #[serde(default)]
    pub genetic_value: GeneticValue,
    /// Probability that an outcrossing offspring has one parent. Ignored
    /// by clonal propagation.
    #[serde(default)]
    pub selfing_rate: f64,
    /// Remove fixed selected mutations from gametes as well as neutral ones.
    #[serde(default)]
    pub prune_selected: bool,
}

impl ModelParams {
    /// Parameters in population-scaled units.
    ///
    /// Uses one neutral region and one recombination region spanning the
    /// locus, and one gamma-DFE selected region with dominance `h`. The
    /// mutation rates are `(11/12)·θ/4N` (neutral) and `(1/12)·θ/4N`
    /// (selected); the recombination rate is `ρ/4N`, with `N` the
    /// reference size.
    pub fn scaled(
        demography: Vec<u32>,
        theta: f64,
        rho: f64,
        reference_size: u32,
        dominance: f64,
    ) -> Result<Self, ParameterError> {
        if reference_size == 0 {
            return Err(ParameterError::ZeroPopulationSize(0));
        }
        let four_n = 4.0 * f64::from(reference_size);
        let params = Self {
            demography,
            neutral_regions: vec![Region::new(0.0, 1.0, 1.0)?],
            selected_regions: vec![SelectedRegion::gamma(
                0.0,
                1.0,
                1.0,
                SCALED_DFE_MEAN,
                SCALED_DFE_SHAPE,
                dominance,
            )?],
            recombination_regions: vec![Region::new(0.0, 1.0, 1.0)?],
            mutation_rate_neutral: SCALED_NEUTRAL_FRACTION * theta / four_n,
            mutation_rate_selected: (1.0 - SCALED_NEUTRAL_FRACTION) * theta / four_n,
            recombination_rate: rho / four_n,
            genetic_value: GeneticValue::default(),
            selfing_rate: 0.0,
            prune_selected: false,
        };
        params.validate()?;
        Ok(params)
    }

    /// Number of generations described by the demography.
    pub fn generations(&self) -> usize {
        self.demography.len()
    }

    /// Check every parameter.
    ///
    /// # Errors
    /// Rejects an empty demography or a zero size, negative or
    /// non-finite rates, a selfing rate outside `[0, 1]`, malformed
    /// regions, and positive rates with nowhere to place events.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.demography.is_empty() {
            return Err(ParameterError::EmptyDemography);
        }
        if let Some(generation) = self.demography.iter().position(|&n| n == 0) {
            return Err(ParameterError::ZeroPopulationSize(generation));
        }
        check_rate("neutral mutation rate", self.mutation_rate_neutral)?;
        check_rate("selected mutation rate", self.mutation_rate_selected)?;
        check_rate("recombination rate", self.recombination_rate)?;
        if !(0.0..=1.0).contains(&self.selfing_rate) {
            return Err(ParameterError::InvalidProbability {
                name: "selfing rate",
                value: self.selfing_rate,
            });
        }
        match self.genetic_value {
            GeneticValue::Multiplicative { scaling } | GeneticValue::Additive { scaling }
                if !scaling.is_finite() =>
            {
                return Err(ParameterError::InvalidDfe(format!(
                    "genetic value scaling must be finite, got {scaling}"
                )));
            }
            _ => {}
        }
        self.mutation_model()?;
        self.recombination_map()?;
        Ok(())
    }

    /// Build the mutation model these parameters describe.
    pub fn mutation_model(&self) -> Result<MutationModel, ParameterError> {
        MutationModel::new(
            self.neutral_regions.clone(),
            self.selected_regions.clone(),
            self.mutation_rate_neutral,
            self.mutation_rate_selected,
        )
    }

    /// Build the recombination map these parameters describe.
    pub fn recombination_map(&self) -> Result<RecombinationMap, ParameterError> {
        RecombinationMap::new(self.recombination_regions.clone(), self.recombination_rate)
    }

    /// The same parameters with a different demography.
    pub fn with_demography(&self, demography: Vec<u32>) -> Self {
        Self {
            demography,
            ..self.clone()
        }
    }

    /// The dominance of the first selected region, if any.
    pub fn dominance(&self) -> Option<f64> {
        self.selected_regions.first().map(|r| r.dominance)
    }

    /// The DFE of the first selected region, if any.
    pub fn dfe(&self) -> Option<Dfe> {
        self.selected_regions.first().map(|r| r.dfe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ModelParams {
        ModelParams::scaled(vec![100; 10], 4.0, 1.0, 100, 1.0).unwrap()
    }

    #[test]
    fn test_scaled_rates() {
        let p = ModelParams::scaled(vec![4000; 5], 4.0, 1.0, 4000, 0.0).unwrap();
        let four_n = 16_000.0;
        assert!((p.mutation_rate_neutral - (11.0 / 12.0) * 4.0 / four_n).abs() < 1e-15);
        assert!((p.mutation_rate_selected - (1.0 / 12.0) * 4.0 / four_n).abs() < 1e-15);
        assert!((p.recombination_rate - 1.0 / four_n).abs() < 1e-15);
        assert_eq!(p.dominance(), Some(0.0));
        assert_eq!(
            p.dfe(),
            Some(Dfe::Gamma {
                mean: -0.05,
                shape: 0.3
            })
        );
        assert_eq!(p.generations(), 5);
    }

    #[test]
    fn test_empty_demography() {
        let p = base().with_demography(vec![]);
        assert_eq!(p.validate(), Err(ParameterError::EmptyDemography));
    }

    #[test]
    fn test_zero_size() {
        let p = base().with_demography(vec![10, 0, 10]);
        assert_eq!(p.validate(), Err(ParameterError::ZeroPopulationSize(1)));
    }

    #[test]
    fn test_negative_rates() {
        let mut p = base();
        p.mutation_rate_neutral = -1e-3;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::InvalidRate {
                name: "neutral mutation rate",
                ..
            })
        ));

        let mut p = base();
        p.mutation_rate_selected = -1e-3;
        assert!(p.validate().is_err());

        let mut p = base();
        p.recombination_rate = -1.0;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::InvalidRate {
                name: "recombination rate",
                ..
            })
        ));
    }

    #[test]
    fn test_selfing_rate_bounds() {
        let mut p = base();
        p.selfing_rate = 1.5;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_missing_regions() {
        let mut p = base();
        p.selected_regions.clear();
        assert_eq!(
            p.validate(),
            Err(ParameterError::MissingRegions("selected mutation rate"))
        );
        p.mutation_rate_selected = 0.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults() {
        let json = serde_json::to_value(base()).unwrap();
        let mut obj = json.as_object().unwrap().clone();
        obj.remove("genetic_value");
        obj.remove("selfing_rate");
        obj.remove("prune_selected");
        let back: ModelParams = serde_json::from_value(obj.into()).unwrap();
        assert_eq!(back, base());
    }
}
