//! Pseudo-relevance feedback.
//!
//! The top documents of an initial ranking are assumed relevant. Every term of their `body`
//! term vectors is weighted by how likely it is in those documents and how rare it is in the
//! collection; the heaviest terms become a `#wand` expansion that is mixed with the original
//! query.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs,
    path::Path,
};

use sift_config::FeedbackSettings;
use sift_index::{DEFAULT_FIELD, DocId, IndexAccessor, IndexError};
use sift_query::QueryNode;
use tracing::{debug, warn};

use crate::{EvalError, ScoreList};

/// A document assumed relevant, with its initial score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackDocument {
    /// Internal document id.
    pub docid: DocId,
    /// Score in the initial ranking.
    pub score: f64,
}

impl FeedbackDocument {
    /// Takes the first `docs` entries of a ranked list.
    pub fn top(scores: &ScoreList, docs: usize) -> Vec<Self> {
        scores
            .entries()
            .iter()
            .take(docs)
            .map(|e| Self {
                docid: e.docid,
                score: e.score,
            })
            .collect()
    }
}

/// Initial rankings read from a trec-formatted run file, grouped by query id.
#[derive(Debug, Clone, Default)]
pub struct InitialRanking {
    /// Top documents per query id, in file order.
    by_query: HashMap<String, Vec<FeedbackDocument>>,
}

impl InitialRanking {
    /// Loads the entries ranked `docs` or better from a run file.
    ///
    /// Documents unknown to the index are skipped with a warning.
    pub fn load(path: &Path, index: &dyn IndexAccessor, docs: usize) -> Result<Self, EvalError> {
        let text = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        let mut ranking = Self::default();

        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let invalid = |message: &str| EvalError::InvalidRanking {
                path: path.to_path_buf(),
                line: number + 1,
                message: message.to_string(),
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [query_id, _, external_id, rank, score, _] = fields.as_slice() else {
                return Err(invalid("expected 6 columns"));
            };
            let rank: usize = rank.parse().map_err(|_| invalid("rank is not an integer"))?;
            let score: f64 = score.parse().map_err(|_| invalid("score is not a number"))?;
            if rank > docs {
                continue;
            }

            let docid = match index.internal_id(external_id) {
                Ok(docid) => docid,
                Err(IndexError::NotFound(_)) => {
                    warn!(query = query_id, document = external_id, "skipping unknown feedback document");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            ranking
                .by_query
                .entry((*query_id).to_string())
                .or_default()
                .push(FeedbackDocument { docid, score });
        }
        Ok(ranking)
    }

    /// Top documents for `query_id`; empty if the file has none.
    pub fn documents(&self, query_id: &str) -> &[FeedbackDocument] {
        self.by_query.get(query_id).map_or(&[], Vec::as_slice)
    }
}

/// A weighted expansion term.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionTerm {
    /// Index term in the `body` field.
    pub term: String,
    /// Accumulated weight.
    pub weight: f64,
}

/// Builds expansion queries from feedback documents.
pub struct QueryExpander<'a> {
    /// Source of term vectors and statistics.
    index: &'a dyn IndexAccessor,
    /// Expansion parameters.
    settings: &'a FeedbackSettings,
}

impl<'a> QueryExpander<'a> {
    /// Creates an expander.
    pub fn new(index: &'a dyn IndexAccessor, settings: &'a FeedbackSettings) -> Self {
        Self { index, settings }
    }

    /// The `terms` heaviest expansion terms of `documents`, heaviest first, ties by term.
    pub fn expansion_terms(&self, documents: &[FeedbackDocument]) -> Result<Vec<ExpansionTerm>, EvalError> {
        let mu = self.settings.mu;
        let total = self.index.total_term_count(DEFAULT_FIELD)? as f64;
        let mut weights: HashMap<String, f64> = HashMap::new();

        for document in documents {
            let doclen = self.index.doc_length(DEFAULT_FIELD, document.docid)? as f64;
            for entry in self.index.term_vector(DEFAULT_FIELD, document.docid)? {
                let p = entry.ctf as f64 / total;
                let weight = (f64::from(entry.tf) + mu * p) / (doclen + mu)
                    * document.score
                    * (1.0 / p).ln();
                match weights.entry(entry.term) {
                    Entry::Occupied(mut e) => *e.get_mut() += weight,
                    Entry::Vacant(e) => {
                        e.insert(weight);
                    }
                }
            }
        }

        let mut terms: Vec<ExpansionTerm> = weights
            .into_iter()
            .map(|(term, weight)| ExpansionTerm { term, weight })
            .collect();
        terms.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
        terms.truncate(self.settings.terms);
        debug!(documents = documents.len(), terms = terms.len(), "expansion terms selected");
        Ok(terms)
    }

    /// Mixes `original` with an expansion of `terms`. Without terms the original is kept.
    pub fn expand(&self, original: QueryNode, terms: &[ExpansionTerm]) -> QueryNode {
        if terms.is_empty() {
            return original;
        }
        let weight = self.settings.orig_weight;
        QueryNode::WeightedAnd {
            children: vec![original, expansion_query(terms)],
            weights: vec![weight, 1.0 - weight],
        }
    }
}

/// The expansion as a query tree.
pub fn expansion_query(terms: &[ExpansionTerm]) -> QueryNode {
    QueryNode::WeightedAnd {
        children: terms.iter().map(|t| QueryNode::term(t.term.as_str())).collect(),
        weights: terms.iter().map(|t| t.weight).collect(),
    }
}

/// The expansion as written to the expansion file: `#wand( w1 t1 w2 t2 ... )`.
pub fn format_expansion(terms: &[ExpansionTerm]) -> String {
    let mut text = String::from("#wand( ");
    for term in terms {
        text.push_str(&format!("{:.4} {} ", term.weight, term.term));
    }
    text.push(')');
    text
}
