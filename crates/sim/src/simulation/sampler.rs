//! Per-generation observers of an evolving population.

use crate::errors::RecorderError;
use crate::simulation::Population;

/// A read-only callback invoked once after every generation.
///
/// Implementations decide for themselves how often to do real work; a
/// recorder that samples every tenth generation simply returns early on
/// the other nine.
pub trait TemporalSampler {
    /// Observe the population after a generation has completed.
    fn record(&mut self, population: &Population) -> Result<(), RecorderError>;
}

/// A sampler that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNothing;

impl TemporalSampler for RecordNothing {
    #[inline]
    fn record(&mut self, _population: &Population) -> Result<(), RecorderError> {
        Ok(())
    }
}

impl<F> TemporalSampler for F
where
    F: FnMut(&Population) -> Result<(), RecorderError>,
{
    fn record(&mut self, population: &Population) -> Result<(), RecorderError> {
        self(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_nothing() {
        let pop = Population::new(3);
        assert!(RecordNothing.record(&pop).is_ok());
    }

    #[test]
    fn test_closure_sampler() {
        let pop = Population::new(3);
        let mut seen = Vec::new();
        let mut sampler = |p: &Population| -> Result<(), RecorderError> {
            seen.push(p.size());
            Ok(())
        };
        sampler.record(&pop).unwrap();
        sampler.record(&pop).unwrap();
        assert_eq!(seen, vec![3, 3]);
    }
}
