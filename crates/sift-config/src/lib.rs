//! Configuration system for sift.
//!
//! A sift run is described by a single TOML file naming the corpus, the retrieval model and its
//! parameters, the query file, the output file, and optionally pseudo-relevance feedback.
//! Relative paths inside the file are resolved against the directory containing it.

#![warn(missing_docs)]

mod error;
mod model;
mod parse;
mod resolve;
mod validate;

use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use model::{Algorithm, Bm25Params, IndriParams, ModelFamily, RetrievalModel};
pub use parse::{
    RawConfig, RawFeedback, RawIndex, RawModel, RawRun, parse_config_file, parse_config_str,
};
pub use resolve::resolve_path;
pub use validate::{
    DEFAULT_RESULT_LIMIT, DEFAULT_RUN_ID, DEFAULT_STEMMER, resolve_config, resolve_model,
};

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Corpus settings.
    pub index: IndexSettings,
    /// Retrieval model and its parameters.
    pub model: RetrievalModel,
    /// Batch run settings.
    pub run: RunSettings,
    /// Query expansion settings, present only when feedback is enabled.
    pub feedback: Option<FeedbackSettings>,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        resolve_config(raw, config_dir)
    }
}

/// Corpus settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Absolute path to the corpus file.
    pub path: PathBuf,
    /// Stemming language for the analyzer.
    pub stemmer: String,
}

/// Batch run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Query file, one `qid:query` per line.
    pub queries: PathBuf,
    /// Trec-formatted output file.
    pub output: PathBuf,
    /// Maximum number of result lines written per query.
    pub limit: usize,
    /// Run identifier in the last output column.
    pub run_id: String,
    /// Number of worker threads evaluating queries.
    pub threads: usize,
}

/// Pseudo-relevance feedback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSettings {
    /// Number of top documents treated as relevant.
    pub docs: usize,
    /// Number of expansion terms added to the query.
    pub terms: usize,
    /// Dirichlet prior used when weighting candidate terms.
    pub mu: f64,
    /// Weight given to the original query in the expanded query.
    pub orig_weight: f64,
    /// Optional trec-formatted ranking used instead of an initial retrieval.
    pub initial_ranking: Option<PathBuf>,
    /// File receiving one `qid: expanded-query` line per query.
    pub expansion_output: PathBuf,
}
