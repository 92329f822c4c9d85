//! Structured query parsing for sift.
//!
//! This crate turns query lines into operator trees:
//!
//! - **Terms**: `crab` - searched in the `body` field
//! - **Fields**: `crab.title` - also `url`, `keywords`, `inlink`, `body`
//! - **Boolean**: `#and(a b)`, `#or(a b)`
//! - **Synonyms**: `#syn(crab crustacean)`
//! - **Proximity**: `#near/2(a b)` (ordered), `#window/8(a b)` (unordered)
//! - **Scoring**: `#sum(a b)`, `#wand(0.7 a 0.3 b)`, `#wsum(0.7 a 0.3 b)`
//!
//! Every query is wrapped in the retrieval model's root operator.
//!
//! # Example
//!
//! ```
//! use sift_config::RetrievalModel;
//! use sift_query::{QueryNode, parse};
//!
//! let mut analyzer = |text: &str| vec![text.to_lowercase()];
//! let tree = parse("#syn(Crab crustacean) ocean", &RetrievalModel::RankedBoolean, &mut analyzer)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(tree.to_query_string(), "#or(#syn(crab crustacean) ocean)");
//! assert!(matches!(tree, QueryNode::Or(_)));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod line;
mod parser;

pub use ast::QueryNode;
pub use error::{LexError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{Lexeme, OperatorKind, Token, tokenize};
pub use line::{QueryLine, parse_query_line};
pub use parser::{TermAnalyzer, parse, parse_with_root, root_operator};
