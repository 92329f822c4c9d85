//! Error types for the sift-eval crate.

use std::{io, path::PathBuf};

use sift_index::IndexError;
use sift_query::QueryError;
use thiserror::Error;

/// Errors that can occur while evaluating queries or running a batch.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The index could not answer a lookup.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A query could not be parsed.
    #[error("{0}")]
    Query(#[from] QueryError),

    /// The operator has no meaning under the retrieval model.
    #[error("{operator} is not supported by the {model} retrieval model")]
    UnsupportedOperator {
        /// Operator keyword.
        operator: String,
        /// Name of the retrieval model.
        model: &'static str,
    },

    /// A weighted operator has a different number of weights and arguments.
    #[error("{operator} has {children} arguments but {weights} weights")]
    WeightMismatch {
        /// Operator keyword.
        operator: String,
        /// Number of arguments.
        children: usize,
        /// Number of weights.
        weights: usize,
    },

    /// The weights of a weighted operator do not sum to a positive number.
    #[error("{operator} weights must sum to a positive number")]
    InvalidWeights {
        /// Operator keyword.
        operator: String,
    },

    /// A list operator received an argument that does not produce postings.
    #[error("invalid argument in {operator}: arguments must be terms or list operators")]
    InvalidArgument {
        /// Operator keyword.
        operator: String,
    },

    /// List operator arguments search different fields.
    #[error("arguments of {operator} must be in the same field: found {expected} and {found}")]
    FieldMismatch {
        /// Operator keyword.
        operator: String,
        /// Field of the first argument.
        expected: String,
        /// Conflicting field.
        found: String,
    },

    /// Failed to read or write a run file.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A line of a trec-formatted ranking file is malformed.
    #[error("invalid ranking line {line} in {path}: {message}")]
    InvalidRanking {
        /// Path to the ranking file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        message: String,
    },

    /// Evaluating one query of a batch failed.
    #[error("query {id}: {source}")]
    InQuery {
        /// Query id from the query file.
        id: String,
        /// What went wrong.
        source: Box<Self>,
    },

    /// A worker thread panicked while evaluating queries.
    #[error("query worker thread panicked")]
    WorkerPanicked,
}

impl EvalError {
    /// Creates an `Io` error for `path`.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attaches the id of the query being evaluated.
    pub(crate) fn in_query(self, id: &str) -> Self {
        Self::InQuery {
            id: id.to_string(),
            source: Box::new(self),
        }
    }
}
