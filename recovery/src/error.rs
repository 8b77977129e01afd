//! Error types.
//!
//! Taxonomy:
//! - [`ModelError`]: invalid input to the choice model or an exhausted sampler.
//!   Fails generation of the affected agent before anything reaches a dataset.
//! - [`ConfigError`]: invalid settings. Fatal at startup, before any simulation.
//! - Optimizer non-convergence is not an error: it is a
//!   [`FitResult`](crate::types::FitResult) with `converged == false`.
//! - Logistic overflow is handled by clamping and never surfaces.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid model input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("probability must be in (0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    #[error("reward must be strictly positive, got {0}")]
    NonPositiveReward(f64),

    #[error("non-finite model input: {0}")]
    NonFinite(&'static str),

    #[error("truncated sampler for {parameter} exhausted {attempts} draws")]
    SamplerExhausted {
        parameter: &'static str,
        attempts: usize,
    },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Top-level error for simulation and recovery runs.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("agent {agent}: {source}")]
    Model {
        agent: usize,
        #[source]
        source: ModelError,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize summary")]
    Serialize(#[from] serde_json::Error),
}

impl RecoveryError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn model(agent: usize, source: ModelError) -> Self {
        Self::Model { agent, source }
    }
}

pub type Result<T> = std::result::Result<T, RecoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_names_agent() {
        let err = RecoveryError::model(7, ModelError::NonPositiveReward(-1.0));
        let msg = err.to_string();
        assert!(msg.contains("agent 7"), "{msg}");
        assert!(msg.contains("-1"), "{msg}");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: RecoveryError = ConfigError::invalid("num_agents must be > 0").into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: num_agents must be > 0"
        );
    }
}
