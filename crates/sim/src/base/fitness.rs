use std::fmt;
use std::iter::Sum;
use std::ops::{Deref, Mul, MulAssign};

use serde::{Deserialize, Serialize};

/// A diploid fitness value, constrained to be non-negative.
///
/// Beneficial mutations can push fitness above 1.0, so only the lower
/// bound is enforced.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FitnessValue(f64);

impl FitnessValue {
    /// Fitness of an individual that cannot reproduce.
    pub const LETHAL: FitnessValue = FitnessValue(0.0);

    /// Creates a new FitnessValue, clamping negative (and NaN) input to 0.0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// Returns the inner f64 value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns true if this individual cannot reproduce.
    pub fn is_lethal(self) -> bool {
        self.0 == 0.0
    }

    /// Natural logarithm of the fitness (`-inf` for lethal).
    pub fn ln(self) -> f64 {
        self.0.ln()
    }
}

impl Deref for FitnessValue {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<FitnessValue> for f64 {
    fn from(fitness: FitnessValue) -> Self {
        fitness.0
    }
}

impl From<f64> for FitnessValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Mul for FitnessValue {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        FitnessValue::new(self.0 * rhs.0)
    }
}

impl MulAssign for FitnessValue {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for FitnessValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        FitnessValue::new(iter.map(|f| f.0).sum())
    }
}

impl<'a> Sum<&'a FitnessValue> for FitnessValue {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_negative_to_zero() {
        assert_eq!(FitnessValue::new(-0.3).get(), 0.0);
        assert!(FitnessValue::new(-0.3).is_lethal());
    }

    #[test]
    fn test_new_clamps_nan_to_zero() {
        assert_eq!(FitnessValue::new(f64::NAN).get(), 0.0);
    }

    #[test]
    fn test_values_above_one_are_kept() {
        assert_eq!(FitnessValue::new(1.25).get(), 1.25);
    }

    #[test]
    fn test_default_is_one() {
        assert_eq!(FitnessValue::default().get(), 1.0);
    }

    #[test]
    fn test_mul_and_mul_assign() {
        let a = FitnessValue::new(0.5);
        let b = FitnessValue::new(0.4);
        assert!(((a * b).get() - 0.2).abs() < 1e-12);

        let mut c = FitnessValue::default();
        c *= a;
        c *= FitnessValue::LETHAL;
        assert!(c.is_lethal());
    }

    #[test]
    fn test_sum() {
        let values = [FitnessValue::new(0.5), FitnessValue::new(0.25)];
        let total: FitnessValue = values.iter().sum();
        assert_eq!(total.get(), 0.75);
    }

    #[test]
    fn test_ln_of_lethal_is_negative_infinity() {
        assert!(FitnessValue::LETHAL.ln().is_infinite());
        assert_eq!(FitnessValue::default().ln(), 0.0);
    }
}
