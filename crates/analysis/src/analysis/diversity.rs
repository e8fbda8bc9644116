//! Diversity metrics for population genetics
//!
//! Estimators of θ and the neutrality tests built on them, computed from
//! the site frequency spectrum of a [`SampleMatrix`]. All values are sums
//! over the locus, not per-site. Sites fixed in the sample are ignored.
//!
//! Every function returns `NaN` when the statistic is undefined: fewer
//! than two chromosomes, or (for the tests) no segregating sites.

use crate::analysis::polymorphism::site_frequency_spectrum;
use crate::analysis::sample::SampleMatrix;
use crate::analysis::utils::{harmonic_number, harmonic_number_squared};

/// Derived-allele counts `i` with their site counts `ξ_i`, for `0 < i < n`.
fn spectrum(sample: &SampleMatrix) -> impl Iterator<Item = (f64, f64)> {
    let sfs = site_frequency_spectrum(sample);
    let n = sample.chromosomes();
    sfs.into_iter()
        .enumerate()
        .filter(move |&(i, xi)| i > 0 && i < n && xi > 0)
        .map(|(i, xi)| (i as f64, xi as f64))
}

fn segregating(sample: &SampleMatrix) -> f64 {
    spectrum(sample).map(|(_, xi)| xi).sum()
}

/// Nucleotide diversity θ_π: mean pairwise differences.
///
/// # Formula
///
/// $$\theta_\pi = \frac{\sum_i 2 i (n - i) \xi_i}{n (n - 1)}$$
///
/// # References
///
/// Tajima, F. (1983). Evolutionary relationship of DNA sequences in finite
/// populations. Genetics, 105(2), 437-460.
pub fn theta_pi(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes() as f64;
    if n < 2.0 {
        return f64::NAN;
    }
    spectrum(sample)
        .map(|(i, xi)| 2.0 * i * (n - i) * xi)
        .sum::<f64>()
        / (n * (n - 1.0))
}

/// Watterson's estimator θ_W = S / a_n.
///
/// # References
///
/// Watterson, G. A. (1975). On the number of segregating sites in genetical
/// models without recombination. Theoretical Population Biology, 7(2), 256-276.
pub fn theta_w(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes();
    if n < 2 {
        return f64::NAN;
    }
    segregating(sample) / harmonic_number(n)
}

/// Fay and Wu's θ_H, weighting high-frequency derived alleles.
///
/// $$\theta_H = \frac{\sum_i 2 i^2 \xi_i}{n (n - 1)}$$
pub fn theta_h(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes() as f64;
    if n < 2.0 {
        return f64::NAN;
    }
    spectrum(sample).map(|(i, xi)| 2.0 * i * i * xi).sum::<f64>() / (n * (n - 1.0))
}

/// Zeng's θ_L = Σ i ξ_i / (n - 1).
pub fn theta_l(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes() as f64;
    if n < 2.0 {
        return f64::NAN;
    }
    spectrum(sample).map(|(i, xi)| i * xi).sum::<f64>() / (n - 1.0)
}

/// Calculate Tajima's D statistic
///
/// # Formula
///
/// $$D = \frac{\theta_\pi - \theta_W}{\sqrt{e_1 S + e_2 S (S - 1)}}$$
///
/// Positive D suggests balancing selection or population contraction.
/// Negative D suggests purifying selection or population expansion.
///
/// # References
///
/// Tajima, F. (1989). Statistical method for testing the neutral mutation
/// hypothesis by DNA polymorphism. Genetics, 123(3), 585-595.
pub fn tajimas_d(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes();
    let s = segregating(sample);
    if n < 2 || s == 0.0 {
        return f64::NAN;
    }

    let n_f64 = n as f64;
    let a1 = harmonic_number(n);
    let a2 = harmonic_number_squared(n);

    let b1 = (n_f64 + 1.0) / (3.0 * (n_f64 - 1.0));
    let b2 = 2.0 * (n_f64 * n_f64 + n_f64 + 3.0) / (9.0 * n_f64 * (n_f64 - 1.0));

    let c1 = b1 - 1.0 / a1;
    let c2 = b2 - (n_f64 + 2.0) / (a1 * n_f64) + a2 / (a1 * a1);

    let e1 = c1 / a1;
    let e2 = c2 / (a1 * a1 + a2);

    let var = e1 * s + e2 * s * (s - 1.0);
    if var <= 0.0 {
        return f64::NAN;
    }
    (theta_pi(sample) - s / a1) / var.sqrt()
}

/// Fay and Wu's H = θ_π − θ_H.
///
/// # References
///
/// Fay, J. C., & Wu, C. I. (2000). Hitchhiking under positive Darwinian
/// selection. Genetics, 155(3), 1405-1413.
pub fn fay_wu_h(sample: &SampleMatrix) -> f64 {
    if segregating(sample) == 0.0 {
        return f64::NAN;
    }
    theta_pi(sample) - theta_h(sample)
}

/// Normalized Fay and Wu's H, H' = (θ_π − θ_L) / sqrt(Var(θ_π − θ_L)).
///
/// The variance is
/// $\frac{n-2}{6(n-1)}\theta + \frac{18n^2(3n+2)b_{n+1} - (88n^3+9n^2-13n+6)}{9n(n-1)^2}\theta^2$
/// with θ = θ_W and θ² = S(S − 1) / (a_n² + b_n).
///
/// # References
///
/// Zeng, K., Fu, Y. X., Shi, S., & Wu, C. I. (2006). Statistical tests for
/// detecting positive selection by utilizing high-frequency variants.
/// Genetics, 174(3), 1431-1439.
pub fn normalized_fay_wu_h(sample: &SampleMatrix) -> f64 {
    let n = sample.chromosomes();
    let s = segregating(sample);
    if n < 2 || s == 0.0 {
        return f64::NAN;
    }

    let n_f64 = n as f64;
    let an = harmonic_number(n);
    let bn = harmonic_number_squared(n);
    let bn1 = bn + 1.0 / (n_f64 * n_f64);

    let theta = s / an;
    let theta_sq = s * (s - 1.0) / (an * an + bn);

    let var = (n_f64 - 2.0) / (6.0 * (n_f64 - 1.0)) * theta
        + (18.0 * n_f64 * n_f64 * (3.0 * n_f64 + 2.0) * bn1
            - (88.0 * n_f64.powi(3) + 9.0 * n_f64 * n_f64 - 13.0 * n_f64 + 6.0))
            / (9.0 * n_f64 * (n_f64 - 1.0).powi(2))
            * theta_sq;
    if var <= 0.0 {
        return f64::NAN;
    }
    (theta_pi(sample) - theta_l(sample)) / var.sqrt()
}
