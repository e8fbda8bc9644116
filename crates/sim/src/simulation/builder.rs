//! Builder pattern for creating model parameters.
//!
//! Provides a fluent API for assembling [`ModelParams`] with sensible
//! defaults, validating everything in [`ModelParamsBuilder::build`].

use crate::errors::ParameterError;
use crate::evolution::{Dfe, GeneticValue, Region, SelectedRegion};
use crate::simulation::ModelParams;

/// Builder for constructing [`ModelParams`] with a fluent API.
///
/// # Examples
///
/// ```
/// use clonal_sim::simulation::ModelParamsBuilder;
/// use clonal_sim::evolution::Dfe;
///
/// // Neutral model with recombination
/// let params = ModelParamsBuilder::new()
///     .constant_size(100, 50)
///     .neutral_region(0.0, 1.0, 1.0)
///     .recombination_region(0.0, 1.0, 1.0)
///     .mutation_rates(0.01, 0.0)
///     .recombination_rate(0.001)
///     .build()
///     .unwrap();
/// assert_eq!(params.generations(), 50);
///
/// // With deleterious mutations
/// let params = ModelParamsBuilder::new()
///     .demography(vec![100, 80, 60])
///     .selected_region(0.0, 1.0, 1.0, Dfe::Constant { s: -0.01 }, 0.5)
///     .mutation_rates(0.0, 0.01)
///     .build()
///     .unwrap();
/// assert_eq!(params.demography, vec![100, 80, 60]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelParamsBuilder {
    // Required
    demography: Option<Vec<u32>>,

    // Regions (default: none)
    neutral_regions: Vec<Region>,
    selected_regions: Vec<SelectedRegion>,
    recombination_regions: Vec<Region>,

    // Rates (default: 0.0)
    mutation_rate_neutral: f64,
    mutation_rate_selected: f64,
    recombination_rate: f64,

    genetic_value: GeneticValue,
    selfing_rate: f64,
    prune_selected: bool,
}

impl ModelParamsBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the population size of every generation (required).
    pub fn demography(mut self, sizes: Vec<u32>) -> Self {
        self.demography = Some(sizes);
        self
    }

    /// Keep the population at `size` for `generations` generations.
    pub fn constant_size(self, size: u32, generations: usize) -> Self {
        self.demography(vec![size; generations])
    }

    /// Add a neutral mutation region.
    pub fn neutral_region(mut self, begin: f64, end: f64, weight: f64) -> Self {
        self.neutral_regions.push(Region { begin, end, weight });
        self
    }

    /// Add a selected mutation region.
    pub fn selected_region(
        mut self,
        begin: f64,
        end: f64,
        weight: f64,
        dfe: Dfe,
        dominance: f64,
    ) -> Self {
        self.selected_regions.push(SelectedRegion {
            begin,
            end,
            weight,
            dfe,
            dominance,
        });
        self
    }

    /// Add a recombination region.
    pub fn recombination_region(mut self, begin: f64, end: f64, weight: f64) -> Self {
        self.recombination_regions.push(Region { begin, end, weight });
        self
    }

    /// Set neutral and selected mutation rates per gamete (default: 0.0).
    pub fn mutation_rates(mut self, neutral: f64, selected: f64) -> Self {
        self.mutation_rate_neutral = neutral;
        self.mutation_rate_selected = selected;
        self
    }

    /// Set the expected number of crossovers per meiosis (default: 0.0).
    pub fn recombination_rate(mut self, rate: f64) -> Self {
        self.recombination_rate = rate;
        self
    }

    /// Set how selected mutations combine (default: multiplicative, scaling 2).
    pub fn genetic_value(mut self, genetic_value: GeneticValue) -> Self {
        self.genetic_value = genetic_value;
        self
    }

    /// Set the selfing probability for outcrossing (default: 0.0).
    pub fn selfing_rate(mut self, rate: f64) -> Self {
        self.selfing_rate = rate;
        self
    }

    /// Also remove fixed selected mutations (default: false).
    pub fn prune_selected(mut self, prune: bool) -> Self {
        self.prune_selected = prune;
        self
    }

    /// Build and validate the parameters.
    pub fn build(self) -> Result<ModelParams, ParameterError> {
        let demography = self
            .demography
            .ok_or(ParameterError::MissingRequired("demography"))?;

        let params = ModelParams {
            demography,
            neutral_regions: self.neutral_regions,
            selected_regions: self.selected_regions,
            recombination_regions: self.recombination_regions,
            mutation_rate_neutral: self.mutation_rate_neutral,
            mutation_rate_selected: self.mutation_rate_selected,
            recombination_rate: self.recombination_rate,
            genetic_value: self.genetic_value,
            selfing_rate: self.selfing_rate,
            prune_selected: self.prune_selected,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = ModelParamsBuilder::new().constant_size(10, 3).build().unwrap();
        assert_eq!(params.demography, vec![10, 10, 10]);
        assert_eq!(params.mutation_rate_neutral, 0.0);
        assert_eq!(params.genetic_value, GeneticValue::default());
        assert!(!params.prune_selected);
    }

    #[test]
    fn test_builder_missing_demography() {
        let result = ModelParamsBuilder::new().build();
        assert_eq!(
            result.unwrap_err(),
            ParameterError::MissingRequired("demography")
        );
    }

    #[test]
    fn test_builder_validates_regions() {
        let result = ModelParamsBuilder::new()
            .constant_size(10, 1)
            .neutral_region(0.5, 0.1, 1.0)
            .build();
        assert!(matches!(result, Err(ParameterError::InvalidRegion { .. })));
    }

    #[test]
    fn test_builder_rate_without_region() {
        let result = ModelParamsBuilder::new()
            .constant_size(10, 1)
            .recombination_rate(0.5)
            .build();
        assert_eq!(
            result.unwrap_err(),
            ParameterError::MissingRegions("recombination rate")
        );
    }

    #[test]
    fn test_builder_full() {
        let params = ModelParamsBuilder::new()
            .constant_size(20, 5)
            .neutral_region(0.0, 1.0, 1.0)
            .selected_region(0.0, 1.0, 1.0, Dfe::Constant { s: -0.01 }, 0.5)
            .recombination_region(0.0, 1.0, 1.0)
            .mutation_rates(0.01, 0.001)
            .recombination_rate(0.01)
            .genetic_value(GeneticValue::Additive { scaling: 2.0 })
            .selfing_rate(0.25)
            .prune_selected(true)
            .build()
            .unwrap();
        assert_eq!(params.selfing_rate, 0.25);
        assert!(params.prune_selected);
        assert_eq!(params.selected_regions.len(), 1);
    }
}
