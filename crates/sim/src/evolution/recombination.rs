//! Crossing over between the two gametes of a parent.
//!
//! The number of crossovers per meiosis is Poisson with mean `rate`.
//! Breakpoint positions are drawn from weighted regions and sorted. The
//! recombinant gamete copies the first parental gamete up to the first
//! breakpoint, then the second up to the next, and so on.

use crate::base::{Mutation, MutationKey};
use crate::errors::ParameterError;
use crate::evolution::mutation::check_rate;
use crate::evolution::regions::Region;
use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Crossover positions and rate for one locus.
#[derive(Debug, Clone)]
pub struct RecombinationMap {
    regions: Vec<Region>,
    rate: f64,
    poisson: Option<Poisson<f64>>,
    index: Option<WeightedIndex<f64>>,
}

impl RecombinationMap {
    /// Create a recombination map.
    ///
    /// # Errors
    /// Returns an error if `rate` is negative or not finite, a region is
    /// malformed, or `rate > 0` with no positively weighted region.
    pub fn new(regions: Vec<Region>, rate: f64) -> Result<Self, ParameterError> {
        check_rate("recombination rate", rate)?;
        for region in &regions {
            region.validate()?;
        }
        let (poisson, index) = if rate > 0.0 {
            let index = WeightedIndex::new(regions.iter().map(|r| r.weight))
                .map_err(|_| ParameterError::MissingRegions("recombination rate"))?;
            let poisson = Poisson::new(rate).map_err(|_| ParameterError::InvalidRate {
                name: "recombination rate",
                value: rate,
            })?;
            (Some(poisson), Some(index))
        } else {
            (None, None)
        };
        Ok(Self {
            regions,
            rate,
            poisson,
            index,
        })
    }

    /// A map without crossovers.
    pub fn none() -> Self {
        Self {
            regions: Vec::new(),
            rate: 0.0,
            poisson: None,
            index: None,
        }
    }

    /// Expected number of crossovers per meiosis.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Sample sorted breakpoint positions for one meiosis.
    pub fn breakpoints<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let (Some(poisson), Some(index)) = (&self.poisson, &self.index) else {
            return Vec::new();
        };
        let n = poisson.sample(rng) as usize;
        let mut positions: Vec<f64> = (0..n)
            .map(|_| self.regions[index.sample(rng)].sample_position(rng))
            .collect();
        positions.sort_by(f64::total_cmp);
        positions
    }
}

/// Combine two position-sorted key lists at `breakpoints`.
///
/// Keys of `first` are kept in even segments, keys of `second` in odd
/// segments. A mutation sitting exactly on a breakpoint belongs to the
/// segment that starts there. The result is position-sorted.
pub fn recombine_keys(
    first: &[MutationKey],
    second: &[MutationKey],
    breakpoints: &[f64],
    mutations: &[Mutation],
) -> Vec<MutationKey> {
    if breakpoints.is_empty() {
        return first.to_vec();
    }
    let segment = |key: MutationKey| -> usize {
        let position = mutations[key as usize].position;
        breakpoints.partition_point(|&b| b <= position)
    };
    let mut from_first = first.iter().copied().filter(|&k| segment(k) % 2 == 0);
    let mut from_second = second.iter().copied().filter(|&k| segment(k) % 2 == 1);

    let mut out = Vec::with_capacity(first.len().max(second.len()));
    let mut a = from_first.next();
    let mut b = from_second.next();
    loop {
        match (a, b) {
            (Some(x), Some(y)) => {
                if mutations[x as usize].position <= mutations[y as usize].position {
                    out.push(x);
                    a = from_first.next();
                } else {
                    out.push(y);
                    b = from_second.next();
                }
            }
            (Some(x), None) => {
                out.push(x);
                a = from_first.next();
            }
            (None, Some(y)) => {
                out.push(y);
                b = from_second.next();
            }
            (None, None) => break,
        }
    }
    out
}
