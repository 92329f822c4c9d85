//! Configuration file parsing.
//!
//! Parses a run configuration file into an intermediate [`RawConfig`] whose fields are all
//! optional. Presence and range checks happen later, when the raw config is resolved.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Index section.
    pub index: Option<RawIndex>,
    /// Retrieval model section.
    pub model: Option<RawModel>,
    /// Batch run section.
    pub run: Option<RawRun>,
    /// Pseudo-relevance feedback section.
    pub feedback: Option<RawFeedback>,
}

/// Raw `[index]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIndex {
    /// Path to the corpus file.
    pub path: Option<String>,
    /// Stemming language.
    pub stemmer: Option<String>,
}

/// Raw `[model]` section.
///
/// Parameters for every algorithm live side by side; only those belonging to the selected
/// algorithm are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawModel {
    /// Algorithm name.
    pub algorithm: Option<String>,
    /// BM25 k1.
    pub k1: Option<f64>,
    /// BM25 b.
    pub b: Option<f64>,
    /// BM25 k3.
    pub k3: Option<f64>,
    /// Indri mu.
    pub mu: Option<f64>,
    /// Indri lambda.
    pub lambda: Option<f64>,
}

/// Raw `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawRun {
    /// Query file path.
    pub queries: Option<String>,
    /// Trec output path.
    pub output: Option<String>,
    /// Maximum result lines per query.
    pub limit: Option<usize>,
    /// Run identifier printed in the last column.
    pub run_id: Option<String>,
    /// Number of worker threads.
    pub threads: Option<usize>,
}

/// Raw `[feedback]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFeedback {
    /// Whether feedback is enabled. Defaults to true when the section is present.
    pub enabled: Option<bool>,
    /// Number of feedback documents.
    pub docs: Option<usize>,
    /// Number of expansion terms.
    pub terms: Option<usize>,
    /// Dirichlet prior for the expansion term weights.
    pub mu: Option<f64>,
    /// Weight of the original query.
    pub orig_weight: Option<f64>,
    /// Optional trec-formatted initial ranking.
    pub initial_ranking: Option<String>,
    /// Where expansion queries are written.
    pub expansion_output: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
