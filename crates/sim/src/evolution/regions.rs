//! Genomic regions and distributions of fitness effects.
//!
//! Regions are half-open intervals on the continuous locus `[0, 1)`.
//! Each carries a weight: when an event (mutation or crossover) happens,
//! the region it lands in is chosen with probability proportional to its
//! weight, and the position is uniform within the region.

use crate::errors::ParameterError;
use rand::Rng;
use rand_distr::{Distribution, Exp, Gamma, Normal};
use serde::{Deserialize, Serialize};

/// A weighted interval used for neutral mutations and crossovers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub begin: f64,
    pub end: f64,
    pub weight: f64,
}

impl Region {
    /// Create a new region, validating its bounds and weight.
    pub fn new(begin: f64, end: f64, weight: f64) -> Result<Self, ParameterError> {
        let region = Self { begin, end, weight };
        region.validate()?;
        Ok(region)
    }

    /// Check that `begin < end` and the weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let bounds_ok = self.begin.is_finite() && self.end.is_finite() && self.begin < self.end;
        let weight_ok = self.weight.is_finite() && self.weight >= 0.0;
        if bounds_ok && weight_ok {
            Ok(())
        } else {
            Err(ParameterError::InvalidRegion {
                begin: self.begin,
                end: self.end,
                weight: self.weight,
            })
        }
    }

    /// Draw a position uniformly within the region.
    #[inline]
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.begin..self.end)
    }
}

/// Distribution of fitness effects for selected mutations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dfe {
    /// Every mutation has the same effect.
    Constant { s: f64 },
    /// Gamma-distributed effects with the given mean and shape.
    ///
    /// The scale is `|mean| / shape` and the sign follows `mean`, so a
    /// negative mean gives deleterious effects.
    Gamma { mean: f64, shape: f64 },
    /// Exponentially distributed effects with the given (signed) mean.
    Exponential { mean: f64 },
    /// Uniform effects on `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Gaussian effects centred on zero.
    Gaussian { sd: f64 },
}

impl Dfe {
    /// Check the distribution's parameters.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let ok = match *self {
            Dfe::Constant { s } => s.is_finite(),
            Dfe::Gamma { mean, shape } => {
                mean.is_finite() && mean != 0.0 && shape.is_finite() && shape > 0.0
            }
            Dfe::Exponential { mean } => mean.is_finite() && mean != 0.0,
            Dfe::Uniform { low, high } => low.is_finite() && high.is_finite() && low < high,
            Dfe::Gaussian { sd } => sd.is_finite() && sd > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ParameterError::InvalidDfe(format!("{self:?}")))
        }
    }

    /// Draw a selection coefficient.
    ///
    /// Parameters must have been validated; invalid parameters yield 0.0.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Dfe::Constant { s } => s,
            Dfe::Gamma { mean, shape } => Gamma::new(shape, mean.abs() / shape)
                .map(|g| mean.signum() * g.sample(rng))
                .unwrap_or(0.0),
            Dfe::Exponential { mean } => Exp::new(1.0 / mean.abs())
                .map(|e| mean.signum() * e.sample(rng))
                .unwrap_or(0.0),
            Dfe::Uniform { low, high } => rng.random_range(low..high),
            Dfe::Gaussian { sd } => Normal::new(0.0, sd)
                .map(|n| n.sample(rng))
                .unwrap_or(0.0),
        }
    }
}

/// A weighted interval where selected mutations arise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedRegion {
    pub begin: f64,
    pub end: f64,
    pub weight: f64,
    /// Distribution of selection coefficients.
    pub dfe: Dfe,
    /// Dominance `h` of new mutations in this region.
    pub dominance: f64,
}

impl SelectedRegion {
    /// Create a new selected region.
    pub fn new(
        begin: f64,
        end: f64,
        weight: f64,
        dfe: Dfe,
        dominance: f64,
    ) -> Result<Self, ParameterError> {
        let region = Self {
            begin,
            end,
            weight,
            dfe,
            dominance,
        };
        region.validate()?;
        Ok(region)
    }

    /// Gamma-distributed effects, the form used by the domestication drivers.
    pub fn gamma(
        begin: f64,
        end: f64,
        weight: f64,
        mean: f64,
        shape: f64,
        dominance: f64,
    ) -> Result<Self, ParameterError> {
        Self::new(begin, end, weight, Dfe::Gamma { mean, shape }, dominance)
    }

    /// Check bounds, weight, dominance and DFE.
    pub fn validate(&self) -> Result<(), ParameterError> {
        Region {
            begin: self.begin,
            end: self.end,
            weight: self.weight,
        }
        .validate()?;
        if !self.dominance.is_finite() {
            return Err(ParameterError::InvalidDfe(format!(
                "dominance must be finite, got {}",
                self.dominance
            )));
        }
        self.dfe.validate()
    }

    /// Draw a position uniformly within the region.
    #[inline]
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.begin..self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_region_validation() {
        assert!(Region::new(0.0, 1.0, 1.0).is_ok());
        assert!(Region::new(1.0, 1.0, 1.0).is_err());
        assert!(Region::new(0.5, 0.2, 1.0).is_err());
        assert!(Region::new(0.0, 1.0, -1.0).is_err());
        assert!(Region::new(0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_region_positions_within_bounds() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let region = Region::new(0.25, 0.5, 1.0).unwrap();
        for _ in 0..1000 {
            let x = region.sample_position(&mut rng);
            assert!((0.25..0.5).contains(&x));
        }
    }

    #[test]
    fn test_gamma_dfe_sign_and_mean() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let dfe = Dfe::Gamma {
            mean: -0.05,
            shape: 0.3,
        };
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| dfe.sample(&mut rng)).collect();
        assert!(draws.iter().all(|&s| s <= 0.0));
        let mean = draws.iter().sum::<f64>() / n as f64;
        assert!((mean + 0.05).abs() < 0.01, "mean was {mean}");
    }

    #[test]
    fn test_constant_and_uniform_dfe() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        assert_eq!(Dfe::Constant { s: -0.1 }.sample(&mut rng), -0.1);
        let dfe = Dfe::Uniform {
            low: -0.2,
            high: -0.1,
        };
        for _ in 0..100 {
            let s = dfe.sample(&mut rng);
            assert!((-0.2..-0.1).contains(&s));
        }
    }

    #[test]
    fn test_dfe_validation() {
        assert!(Dfe::Gamma {
            mean: -0.05,
            shape: 0.0
        }
        .validate()
        .is_err());
        assert!(Dfe::Exponential { mean: 0.0 }.validate().is_err());
        assert!(Dfe::Gaussian { sd: 0.1 }.validate().is_ok());
        assert!(SelectedRegion::gamma(0.0, 1.0, 1.0, -0.05, 0.3, 1.0).is_ok());
        assert!(SelectedRegion::gamma(0.0, 1.0, 1.0, -0.05, 0.3, f64::NAN).is_err());
    }

    #[test]
    fn test_dfe_serde_tagged() {
        let json = serde_json::to_string(&Dfe::Gamma {
            mean: -0.05,
            shape: 0.3,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"gamma\""));
        let back: Dfe = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back,
            Dfe::Gamma {
                mean: -0.05,
                shape: 0.3
            }
        );
    }
}
