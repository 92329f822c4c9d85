//! sift: structured-query retrieval runs.
//!
//! sift evaluates batches of structured queries (`#and`, `#near/3`, `#wand`, ...) against a
//! document corpus under a boolean, BM25 or Indri retrieval model and writes trec-eval run
//! files, optionally expanding each query with pseudo-relevance feedback first.

#![warn(missing_docs)]

pub mod cli;
