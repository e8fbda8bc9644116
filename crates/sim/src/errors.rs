//! Error types for the simulation crate.

use thiserror::Error;

/// Errors raised while validating model parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// The demography has no generations.
    #[error("empty list of population sizes")]
    EmptyDemography,

    /// A generation in the demography has size zero.
    #[error("population size is zero at generation {0}")]
    ZeroPopulationSize(usize),

    /// A rate is negative or not finite.
    #[error("invalid {name}: {value} (must be finite and non-negative)")]
    InvalidRate { name: &'static str, value: f64 },

    /// A probability is outside [0, 1].
    #[error("invalid probability for {name}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability { name: &'static str, value: f64 },

    /// A positive rate was given but no region to place events in.
    #[error("{0} is positive but no regions were given")]
    MissingRegions(&'static str),

    /// A region is malformed.
    #[error("invalid region [{begin}, {end}) with weight {weight}")]
    InvalidRegion { begin: f64, end: f64, weight: f64 },

    /// A distribution of fitness effects could not be built.
    #[error("invalid distribution of fitness effects: {0}")]
    InvalidDfe(String),

    /// A required builder parameter is missing.
    #[error("missing required parameter: {0}")]
    MissingRequired(&'static str),
}

/// Errors raised while evolving a population.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// The parameters did not validate.
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// The population has no individuals to choose parents from.
    #[error("cannot sample parents from an empty population")]
    EmptyPopulation,

    /// The recorder failed.
    #[error("recorder failed: {0}")]
    Recorder(#[from] RecorderError),
}

/// Errors raised by temporal samplers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecorderError {
    /// Sampling from the population failed.
    #[error("sampling failed: {0}")]
    Sampling(String),

    /// Any other recorder-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Database error types.
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Database initialization error: {0}")]
    Initialization(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Insert error: {0}")]
    Insert(String),
    #[error("Close error: {0}")]
    Close(String),
    #[error("Vacuum error: {0}")]
    Vacuum(String),
}

/// Errors raised while loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The scenario file is not valid JSON for a scenario.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The scenario is structurally invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Recorded output could not be stored.
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// A stage failed while evolving.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: EvolutionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::InvalidRate {
            name: "neutral mutation rate",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid neutral mutation rate: -1 (must be finite and non-negative)"
        );
        assert_eq!(
            ParameterError::EmptyDemography.to_string(),
            "empty list of population sizes"
        );
    }

    #[test]
    fn test_evolution_error_from_parameter_error() {
        let err: EvolutionError = ParameterError::EmptyDemography.into();
        assert!(matches!(
            err,
            EvolutionError::Parameters(ParameterError::EmptyDemography)
        ));
        assert_eq!(err.to_string(), "empty list of population sizes");
    }

    #[test]
    fn test_scenario_stage_error_carries_name() {
        let err = ScenarioError::Stage {
            stage: "burnin".into(),
            source: EvolutionError::EmptyPopulation,
        };
        assert!(err.to_string().contains("burnin"));
    }
}
