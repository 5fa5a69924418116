//! Miner configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("lambda must be a positive finite number, got {0}")]
    InvalidLambda(f64),

    #[error("{name} must be a non-negative finite number, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{name} must be at least 1")]
    ZeroLimit { name: &'static str },
}

/// Score-difference bands used to classify adjacent ranked activities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationThresholds {
    /// Differences up to and including this value are sequences.
    pub sequence: f64,
    /// Upper bound (inclusive) of the parallel band.
    pub parallel_max: f64,
    /// Differences strictly above this value are choices.
    pub choice: f64,
}

impl Default for RelationThresholds {
    fn default() -> Self {
        Self {
            sequence: 0.2,
            parallel_max: 1.0,
            choice: 1.0,
        }
    }
}

/// Configuration consumed by the calculators and the inference step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Weight applied to the temporal and contextual scores. Default: 0.5.
    pub lambda: f64,

    /// Number of leading traces the contextual calculator considers.
    /// Default: 5000.
    pub context_prefix_size: usize,

    /// Maximum number of traces read from a log. Default: 100.
    pub max_traces: usize,

    pub sequence_threshold: f64,
    pub parallel_threshold_max: f64,
    pub choice_threshold: f64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        let thresholds = RelationThresholds::default();
        Self {
            lambda: 0.5,
            context_prefix_size: 5000,
            max_traces: 100,
            sequence_threshold: thresholds.sequence,
            parallel_threshold_max: thresholds.parallel_max,
            choice_threshold: thresholds.choice,
        }
    }
}

impl MinerConfig {
    pub const fn thresholds(&self) -> RelationThresholds {
        RelationThresholds {
            sequence: self.sequence_threshold,
            parallel_max: self.parallel_threshold_max,
            choice: self.choice_threshold,
        }
    }

    /// Checks every value is usable by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(ConfigError::InvalidLambda(self.lambda));
        }

        for (name, value) in [
            ("sequence_threshold", self.sequence_threshold),
            ("parallel_threshold_max", self.parallel_threshold_max),
            ("choice_threshold", self.choice_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.context_prefix_size == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "context_prefix_size",
            });
        }
        if self.max_traces == 0 {
            return Err(ConfigError::ZeroLimit { name: "max_traces" });
        }

        Ok(())
    }
}
