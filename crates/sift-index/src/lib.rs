//! Index access for sift.
//!
//! This crate provides everything the evaluator needs from an index:
//! - The [`IndexAccessor`] trait: postings, document lengths, field statistics, id mapping
//! - Posting and inverted list types shared by the index and the proximity operators
//! - [`MemoryIndex`], an accessor built from a JSON corpus
//! - Text analysis with configurable stemming, shared by corpus loading and query parsing
//!
//! # Example
//!
//! ```
//! use sift_index::{IndexAccessor, MemoryIndex};
//!
//! let mut builder = MemoryIndex::builder();
//! builder.add_tokens("GX01", &[("body", "crab ocean crab")]).unwrap();
//! let index = builder.build();
//!
//! let list = index.postings("crab", "body").unwrap();
//! assert_eq!(list.doc_freq(), 1);
//! assert_eq!(list.collection_term_freq(), 2);
//! ```

#![warn(missing_docs)]

mod accessor;
mod analyzer;
mod corpus;
mod error;
mod memory;
mod posting;

pub use accessor::IndexAccessor;
pub use analyzer::{AnalyzedToken, Analyzer, build_analyzer, parse_language};
pub use corpus::{SourceDocument, load_corpus};
pub use error::IndexError;
pub use memory::{MemoryIndex, MemoryIndexBuilder};
pub use posting::{InvertedList, Posting, TermCount};

/// Internal document id, dense from zero.
pub type DocId = u32;

/// Field searched when a query term carries no field suffix.
pub const DEFAULT_FIELD: &str = "body";

/// Field suffixes accepted on query terms.
pub const FIELDS: [&str; 5] = ["url", "keywords", "title", "inlink", "body"];
