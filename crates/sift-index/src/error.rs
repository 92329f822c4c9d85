//! Error types for the sift-index crate.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::DocId;

/// Errors that can occur when loading or reading an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An external document id has no internal counterpart.
    #[error("document not found: {0}")]
    NotFound(String),

    /// An internal document id is outside the index.
    #[error("unknown internal document id: {0}")]
    UnknownDocument(DocId),

    /// The corpus names the same external id twice.
    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A corpus file could not be decoded.
    #[error("failed to parse corpus {path} (line {line}): {source}")]
    ParseCorpus {
        /// Path to the corpus file.
        path: PathBuf,
        /// 1-based line of the failing record; 1 for JSON array corpora.
        line: usize,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),

    /// Tantivy ships no stopword list for the language.
    #[error("no stopword list for language: {0}")]
    NoStopwords(String),
}
