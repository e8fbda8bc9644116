//! Polymorphism analysis
//!
//! Functions for analyzing segregating sites and site frequency spectra.

use crate::analysis::sample::SampleMatrix;

/// Count segregating sites: sites where the derived state is carried by
/// at least one but not every chromosome.
pub fn segregating_sites(sample: &SampleMatrix) -> usize {
    let n = sample.chromosomes();
    sample
        .derived_counts()
        .into_iter()
        .filter(|&c| c > 0 && c < n)
        .count()
}

/// Calculate the unfolded site frequency spectrum.
///
/// # Returns
///
/// Vector of length `n + 1` where index `i` holds the number of sites with
/// `i` derived copies. Fixed sites land in index `n`.
pub fn site_frequency_spectrum(sample: &SampleMatrix) -> Vec<usize> {
    let mut sfs = vec![0; sample.chromosomes() + 1];
    for c in sample.derived_counts() {
        sfs[c] += 1;
    }
    sfs
}
