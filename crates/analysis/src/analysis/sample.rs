//! Samples of chromosomes drawn from a population.
//!
//! A [`SampleMatrix`] holds, for every mutation present in a sample, its
//! position and the derived (1) or ancestral (0) state of each sampled
//! chromosome.

use clonal_sim::base::MutationKey;
use clonal_sim::simulation::Population;
use rand::Rng;
use std::collections::HashMap;

/// Position-sorted sites of a sample of `chromosomes` chromosomes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleMatrix {
    chromosomes: usize,
    positions: Vec<f64>,
    states: Vec<Vec<u8>>,
}

impl SampleMatrix {
    /// An empty sample of `chromosomes` chromosomes.
    pub fn new(chromosomes: usize) -> Self {
        Self {
            chromosomes,
            positions: Vec::new(),
            states: Vec::new(),
        }
    }

    /// Build a sample from `(position, states)` pairs.
    ///
    /// # Panics
    /// Panics if a row does not have one state per chromosome.
    pub fn from_sites(chromosomes: usize, mut sites: Vec<(f64, Vec<u8>)>) -> Self {
        assert!(
            sites.iter().all(|(_, row)| row.len() == chromosomes),
            "every site needs one state per chromosome"
        );
        sites.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (positions, states) = sites.into_iter().unzip();
        Self {
            chromosomes,
            positions,
            states,
        }
    }

    /// Number of sampled chromosomes.
    pub fn chromosomes(&self) -> usize {
        self.chromosomes
    }

    /// Number of sites, segregating or not.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// States of site `index`, one per chromosome.
    pub fn site(&self, index: usize) -> Option<&[u8]> {
        self.states.get(index).map(Vec::as_slice)
    }

    /// Number of chromosomes carrying the derived state at each site.
    pub fn derived_counts(&self) -> Vec<usize> {
        self.states
            .iter()
            .map(|row| row.iter().filter(|&&s| s == 1).count())
            .collect()
    }

    /// Drop sites carried by every chromosome.
    pub fn remove_fixed(&mut self) {
        let n = self.chromosomes;
        let keep: Vec<bool> = self
            .states
            .iter()
            .map(|row| row.iter().filter(|&&s| s == 1).count() < n)
            .collect();
        let mut flags = keep.iter();
        self.positions.retain(|_| *flags.next().unwrap_or(&true));
        let mut flags = keep.iter();
        self.states.retain(|_| *flags.next().unwrap_or(&true));
    }

    /// Combine two samples of the same chromosomes into one sorted sample.
    ///
    /// # Panics
    /// Panics if the samples differ in size.
    pub fn merge(&self, other: &SampleMatrix) -> SampleMatrix {
        assert_eq!(
            self.chromosomes, other.chromosomes,
            "cannot merge samples of different sizes"
        );
        let sites = self
            .positions
            .iter()
            .copied()
            .zip(self.states.iter().cloned())
            .chain(other.positions.iter().copied().zip(other.states.iter().cloned()))
            .collect();
        SampleMatrix::from_sites(self.chromosomes, sites)
    }
}

/// Draw `n` diploids uniformly with replacement and return the neutral and
/// selected sites carried by their `2n` chromosomes.
///
/// Diploid `i` of the sample contributes chromosomes `2i` and `2i + 1`.
/// With `remove_fixed`, sites carried by every sampled chromosome are
/// dropped.
pub fn sample_separate<R: Rng + ?Sized>(
    rng: &mut R,
    population: &Population,
    n: usize,
    remove_fixed: bool,
) -> (SampleMatrix, SampleMatrix) {
    let chromosomes = 2 * n;
    if population.is_empty() || n == 0 {
        return (SampleMatrix::new(chromosomes), SampleMatrix::new(chromosomes));
    }

    let mut neutral: HashMap<MutationKey, Vec<u8>> = HashMap::new();
    let mut selected: HashMap<MutationKey, Vec<u8>> = HashMap::new();
    for i in 0..n {
        let ind = &population.individuals()[rng.random_range(0..population.size())];
        for (offset, key) in [ind.first(), ind.second()].into_iter().enumerate() {
            let column = 2 * i + offset;
            let gamete = &population.gametes()[key];
            for &m in gamete.neutral() {
                neutral.entry(m).or_insert_with(|| vec![0; chromosomes])[column] = 1;
            }
            for &m in gamete.selected() {
                selected.entry(m).or_insert_with(|| vec![0; chromosomes])[column] = 1;
            }
        }
    }

    let build = |sites: HashMap<MutationKey, Vec<u8>>| {
        let rows = sites
            .into_iter()
            .map(|(key, row)| (population.mutations()[key as usize].position, row))
            .collect();
        let mut matrix = SampleMatrix::from_sites(chromosomes, rows);
        if remove_fixed {
            matrix.remove_fixed();
        }
        matrix
    };
    (build(neutral), build(selected))
}
