//! Query evaluation for sift.
//!
//! Operator trees from `sift-query` are evaluated document-at-a-time against an
//! [`IndexAccessor`](sift_index::IndexAccessor) under one of four retrieval models, ranked,
//! and written as trec-eval run files. Pseudo-relevance feedback and threaded batch runs are
//! built on top.
//!
//! ```
//! use sift_config::RetrievalModel;
//! use sift_eval::{EvaluationResult, Evaluator};
//! use sift_index::MemoryIndex;
//! use sift_query::parse;
//!
//! let mut builder = MemoryIndex::builder();
//! builder.add_tokens("a", &[("body", "crab ocean")]).unwrap();
//! builder.add_tokens("b", &[("body", "ocean")]).unwrap();
//! let index = builder.build();
//!
//! let model = RetrievalModel::RankedBoolean;
//! let mut analyzer = |text: &str| vec![text.to_string()];
//! let query = parse("#and(crab ocean)", &model, &mut analyzer).unwrap().unwrap();
//! let ranking = Evaluator::new(&index, model)
//!     .evaluate(&query)
//!     .unwrap()
//!     .into_ranking(&model, &index, 100)
//!     .unwrap();
//! assert_eq!(ranking.len(), 1);
//! ```

#![warn(missing_docs)]

mod batch;
mod cursor;
mod error;
mod evaluator;
mod feedback;
mod proximity;
mod rank;
mod score;
mod scoring;
mod trec;

pub use batch::{Batch, QueryOutcome, RunSummary, load_index, read_queries, run};
pub use cursor::{DaatCursor, DocEntry, min_docid};
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use feedback::{
    ExpansionTerm, FeedbackDocument, InitialRanking, QueryExpander, expansion_query,
    format_expansion,
};
pub use proximity::{near, syn, window};
pub use rank::rank;
pub use score::{EvaluationResult, ScoreEntry, ScoreList};
pub use scoring::{DefaultScore, score_list};
pub use trec::{EMPTY_RESULT_ID, EMPTY_RESULT_RUN_ID, format_ranking, format_score};
