//! Utility functions for analysis module
//!
//! Shared helper functions used across analysis submodules.

/// Mean of the finite values; NaN when there are none.
pub fn finite_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Cache for commonly used harmonic numbers
/// Note: harmonic_number(n) = sum_{i=1}^{n-1} 1/i
static HARMONIC_CACHE: [f64; 11] = [
    0.0,                // n=0 (unused)
    0.0,                // n=1
    1.0,                // n=2
    1.5,                // n=3
    1.8333333333333333, // n=4
    2.083333333333333,  // n=5
    2.283333333333333,  // n=6
    2.45,               // n=7
    2.5928571428571425, // n=8
    2.7178571428571425, // n=9
    2.8289682539682537, // n=10
];

/// `a_n = Σ_{i=1}^{n-1} 1/i`
#[inline]
pub fn harmonic_number(n: usize) -> f64 {
    if n < HARMONIC_CACHE.len() {
        HARMONIC_CACHE[n]
    } else {
        (1..n).map(|i| 1.0 / i as f64).sum()
    }
}

/// `b_n = Σ_{i=1}^{n-1} 1/i²`
#[inline]
pub fn harmonic_number_squared(n: usize) -> f64 {
    (1..n).map(|i| 1.0 / (i * i) as f64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_mean_skips_nan() {
        assert_eq!(finite_mean([1.0, f64::NAN, 3.0]), 2.0);
        assert!(finite_mean([f64::NAN]).is_nan());
    }

    #[test]
    fn test_finite_mean_skips_infinities() {
        assert_eq!(finite_mean([f64::INFINITY, 4.0, f64::NEG_INFINITY]), 4.0);
        assert!(finite_mean(std::iter::empty()).is_nan());
    }

    #[test]
    fn test_harmonic_numbers() {
        for n in 0..15 {
            let direct: f64 = (1..n).map(|i| 1.0 / i as f64).sum();
            assert!((harmonic_number(n) - direct).abs() < 1e-12);
        }
        assert!((harmonic_number_squared(3) - 1.25).abs() < 1e-12);
    }
}
