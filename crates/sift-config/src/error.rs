//! Error types for sift configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or validating configuration.
///
/// Every variant is fatal: a run never starts with a configuration that produced one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A required key is absent.
    #[error("missing required parameter '{key}'")]
    MissingParameter {
        /// Dotted key, e.g. `model.k1`.
        key: String,
    },

    /// A parameter is present but outside its permitted range.
    #[error("invalid value for '{key}': {value} ({expected})")]
    InvalidParameter {
        /// Dotted key, e.g. `model.lambda`.
        key: String,
        /// The rejected value, rendered as text.
        value: String,
        /// Description of the accepted range.
        expected: &'static str,
    },

    /// The retrieval algorithm name is not recognized.
    #[error("unknown retrieval algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Pseudo-relevance feedback was enabled for a model that cannot score weighted queries.
    #[error("query expansion requires the Indri retrieval model, not {model}")]
    FeedbackRequiresIndri {
        /// Name of the configured model.
        model: &'static str,
    },

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    /// Creates a `MissingParameter` error.
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingParameter { key: key.into() }
    }

    /// Creates an `InvalidParameter` error.
    pub(crate) fn invalid(key: impl Into<String>, value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            value: value.to_string(),
            expected,
        }
    }
}
