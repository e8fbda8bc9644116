//! New mutations under the infinite-sites model.
//!
//! Every gamete passed to an offspring receives a Poisson number of new
//! mutations with mean `mu_neutral + mu_selected`. Each new mutation is
//! neutral with probability `mu_neutral / (mu_neutral + mu_selected)`.
//! Its region is chosen in proportion to the region weights and its
//! position is uniform within the region. A position already occupied by
//! a segregating mutation is re-drawn, so no two segregating mutations
//! ever share a site.

use crate::base::Mutation;
use crate::errors::ParameterError;
use crate::evolution::regions::{Region, SelectedRegion};
use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Source of new mutations for one set of parameters.
#[derive(Debug, Clone)]
pub struct MutationModel {
    neutral_regions: Vec<Region>,
    selected_regions: Vec<SelectedRegion>,
    mu_neutral: f64,
    mu_selected: f64,
    /// `None` when the total rate is zero.
    poisson: Option<Poisson<f64>>,
    neutral_index: Option<WeightedIndex<f64>>,
    selected_index: Option<WeightedIndex<f64>>,
}

impl MutationModel {
    /// Build a mutation model from regions and per-gamete rates.
    ///
    /// # Errors
    /// Returns an error if a rate is negative or not finite, if a region
    /// is malformed, or if a positive rate has no region with positive
    /// weight to place mutations in.
    pub fn new(
        neutral_regions: Vec<Region>,
        selected_regions: Vec<SelectedRegion>,
        mu_neutral: f64,
        mu_selected: f64,
    ) -> Result<Self, ParameterError> {
        check_rate("neutral mutation rate", mu_neutral)?;
        check_rate("selected mutation rate", mu_selected)?;
        for region in &neutral_regions {
            region.validate()?;
        }
        for region in &selected_regions {
            region.validate()?;
        }

        let neutral_index = if mu_neutral > 0.0 {
            Some(
                WeightedIndex::new(neutral_regions.iter().map(|r| r.weight))
                    .map_err(|_| ParameterError::MissingRegions("neutral mutation rate"))?,
            )
        } else {
            None
        };
        let selected_index = if mu_selected > 0.0 {
            Some(
                WeightedIndex::new(selected_regions.iter().map(|r| r.weight))
                    .map_err(|_| ParameterError::MissingRegions("selected mutation rate"))?,
            )
        } else {
            None
        };

        let total = mu_neutral + mu_selected;
        let poisson = if total > 0.0 {
            Some(Poisson::new(total).map_err(|_| ParameterError::InvalidRate {
                name: "total mutation rate",
                value: total,
            })?)
        } else {
            None
        };

        Ok(Self {
            neutral_regions,
            selected_regions,
            mu_neutral,
            mu_selected,
            poisson,
            neutral_index,
            selected_index,
        })
    }

    /// A model that never mutates.
    pub fn none() -> Self {
        Self {
            neutral_regions: Vec::new(),
            selected_regions: Vec::new(),
            mu_neutral: 0.0,
            mu_selected: 0.0,
            poisson: None,
            neutral_index: None,
            selected_index: None,
        }
    }

    /// Expected number of new mutations per gamete.
    #[inline]
    pub fn total_rate(&self) -> f64 {
        self.mu_neutral + self.mu_selected
    }

    /// Neutral rate per gamete.
    pub fn mu_neutral(&self) -> f64 {
        self.mu_neutral
    }

    /// Selected rate per gamete.
    pub fn mu_selected(&self) -> f64 {
        self.mu_selected
    }

    /// Number of new mutations for one gamete.
    #[inline]
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match &self.poisson {
            Some(p) => p.sample(rng) as usize,
            None => 0,
        }
    }

    /// Draw one new mutation arising in `generation`.
    ///
    /// `occupied` reports whether a position is already segregating; such
    /// positions are re-drawn.
    pub fn sample_mutation<R, F>(&self, rng: &mut R, generation: usize, occupied: F) -> Mutation
    where
        R: Rng + ?Sized,
        F: Fn(f64) -> bool,
    {
        let neutral = match (&self.neutral_index, &self.selected_index) {
            (Some(_), None) => true,
            (None, Some(_)) => false,
            _ => rng.random::<f64>() < self.mu_neutral / self.total_rate(),
        };

        if neutral {
            let region = match &self.neutral_index {
                Some(index) => &self.neutral_regions[index.sample(rng)],
                None => &self.neutral_regions[0],
            };
            let position = draw_free(rng, occupied, |rng| region.sample_position(rng));
            Mutation::neutral(position, generation)
        } else {
            let region = match &self.selected_index {
                Some(index) => &self.selected_regions[index.sample(rng)],
                None => &self.selected_regions[0],
            };
            let position = draw_free(rng, occupied, |rng| region.sample_position(rng));
            let effect = region.dfe.sample(rng);
            Mutation::selected(position, effect, region.dominance, generation)
        }
    }
}

fn draw_free<R, F, D>(rng: &mut R, occupied: F, mut draw: D) -> f64
where
    R: Rng + ?Sized,
    F: Fn(f64) -> bool,
    D: FnMut(&mut R) -> f64,
{
    loop {
        let position = draw(rng);
        if !occupied(position) {
            return position;
        }
    }
}

pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError::InvalidRate { name, value })
    }
}
