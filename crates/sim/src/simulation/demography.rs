//! Demographic trajectories: population size per generation.

use crate::errors::ParameterError;
use serde::{Deserialize, Serialize};

/// A sequence of population sizes over `span` generations.
///
/// Sizes are evaluated in floating point and truncated to integers, so a
/// linear decline from 4000 to 200 over 100 generations matches an evenly
/// spaced grid with both end points included. The linear end point is
/// exactly `to`. The exponential end point is exact only in log space, and
/// `exp(ln(to))` can land just below `to`, so its last size is `to` or
/// `to - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trajectory {
    /// The same size in every generation.
    Constant { size: u32, span: usize },
    /// Evenly spaced sizes from `from` to `to`.
    Linear { from: u32, to: u32, span: usize },
    /// Sizes evenly spaced on a log scale from `from` to `to`.
    Exponential { from: u32, to: u32, span: usize },
}

impl Trajectory {
    /// Number of generations covered.
    pub fn span(&self) -> usize {
        match *self {
            Trajectory::Constant { span, .. }
            | Trajectory::Linear { span, .. }
            | Trajectory::Exponential { span, .. } => span,
        }
    }

    /// Check that the span is positive and every size is non-zero.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.span() == 0 {
            return Err(ParameterError::EmptyDemography);
        }
        let zero = match *self {
            Trajectory::Constant { size, .. } => size == 0,
            Trajectory::Linear { from, to, .. } | Trajectory::Exponential { from, to, .. } => {
                from == 0 || to == 0
            }
        };
        if zero {
            return Err(ParameterError::ZeroPopulationSize(0));
        }
        Ok(())
    }

    /// Every size of the trajectory.
    pub fn sizes(&self) -> Vec<u32> {
        match *self {
            Trajectory::Constant { size, span } => vec![size; span],
            Trajectory::Linear { from, to, span } => linspace(f64::from(from), f64::from(to), span)
                .map(|x| x as u32)
                .collect(),
            Trajectory::Exponential { from, to, span } => {
                linspace(f64::from(from).ln(), f64::from(to).ln(), span)
                    .map(|x| x.exp() as u32)
                    .collect()
            }
        }
    }

    /// Sizes for generations `start..end` of the trajectory.
    ///
    /// # Errors
    /// Returns an error if the window is empty or extends past the span.
    pub fn window(&self, start: usize, end: usize) -> Result<Vec<u32>, ParameterError> {
        if start >= end || end > self.span() {
            return Err(ParameterError::EmptyDemography);
        }
        let mut sizes = self.sizes();
        sizes.truncate(end);
        Ok(sizes.split_off(start))
    }
}

/// `n` evenly spaced values from `a` to `b` inclusive.
fn linspace(a: f64, b: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (b - a) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if n > 1 && i == n - 1 { b } else { a + step * i as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let t = Trajectory::Constant { size: 50, span: 4 };
        assert_eq!(t.sizes(), vec![50; 4]);
        assert_eq!(t.span(), 4);
    }

    #[test]
    fn test_linear_endpoints_and_truncation() {
        let t = Trajectory::Linear {
            from: 10,
            to: 1,
            span: 4,
        };
        // 10, 7, 4, 1
        assert_eq!(t.sizes(), vec![10, 7, 4, 1]);

        let t = Trajectory::Linear {
            from: 4000,
            to: 200,
            span: 100,
        };
        let sizes = t.sizes();
        assert_eq!(sizes.len(), 100);
        assert_eq!(sizes[0], 4000);
        assert_eq!(sizes[99], 200);
        // 4000 - 73 * 3800 / 99 = 1197.97...
        assert_eq!(sizes[73], 1197);
    }

    #[test]
    fn test_exponential() {
        let t = Trajectory::Exponential {
            from: 1000,
            to: 10,
            span: 3,
        };
        let sizes = t.sizes();
        assert_eq!(sizes[0], 1000);
        assert!(sizes[1] == 99 || sizes[1] == 100);
        assert!(sizes[2] == 9 || sizes[2] == 10);
    }

    #[test]
    fn test_end_points() {
        for (from, to) in [(4000, 200), (1000, 10), (37, 3), (10, 77), (5000, 1)] {
            let linear = Trajectory::Linear { from, to, span: 25 }.sizes();
            assert_eq!(linear[0], from);
            assert_eq!(linear[24], to);

            let exponential = Trajectory::Exponential { from, to, span: 25 }.sizes();
            assert!(exponential[0] == from || exponential[0] == from - 1);
            assert!(exponential[24] == to || exponential[24] == to - 1);
        }
    }

    #[test]
    fn test_single_generation() {
        let t = Trajectory::Linear {
            from: 30,
            to: 10,
            span: 1,
        };
        assert_eq!(t.sizes(), vec![30]);
    }

    #[test]
    fn test_window() {
        let t = Trajectory::Linear {
            from: 10,
            to: 1,
            span: 4,
        };
        assert_eq!(t.window(0, 2).unwrap(), vec![10, 7]);
        assert_eq!(t.window(2, 4).unwrap(), vec![4, 1]);
        assert!(t.window(3, 3).is_err());
        assert!(t.window(2, 5).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Trajectory::Constant { size: 0, span: 3 }.validate().is_err());
        assert!(Trajectory::Constant { size: 3, span: 0 }.validate().is_err());
        assert!(Trajectory::Exponential {
            from: 10,
            to: 0,
            span: 3
        }
        .validate()
        .is_err());
        assert!(Trajectory::Linear {
            from: 10,
            to: 1,
            span: 3
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_serde_tagged() {
        let t: Trajectory =
            serde_json::from_str(r#"{"type":"linear","from":100,"to":10,"span":5}"#).unwrap();
        assert_eq!(
            t,
            Trajectory::Linear {
                from: 100,
                to: 10,
                span: 5
            }
        );
    }
}
