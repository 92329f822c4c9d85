//! Score lists and evaluation results.

use sift_index::{DocId, IndexAccessor, InvertedList};

use crate::EvalError;

/// A scored document.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// Internal document id.
    pub docid: DocId,
    /// Score under the retrieval model.
    pub score: f64,
    /// External id, filled in on first lookup.
    pub external_id: Option<String>,
}

impl ScoreEntry {
    /// Creates an entry without a cached external id.
    pub fn new(docid: DocId, score: f64) -> Self {
        Self {
            docid,
            score,
            external_id: None,
        }
    }

    /// Returns the external id, looking it up and caching it on first use.
    pub fn external_id(&mut self, index: &dyn IndexAccessor) -> Result<&str, EvalError> {
        let id = match self.external_id.take() {
            Some(id) => id,
            None => index.external_id(self.docid)?,
        };
        Ok(self.external_id.insert(id))
    }
}

/// Scored documents, in ascending docid order until ranked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreList {
    /// The entries.
    entries: Vec<ScoreEntry>,
}

impl ScoreList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a score for `docid`.
    pub fn push(&mut self, docid: DocId, score: f64) {
        self.entries.push(ScoreEntry::new(docid, score));
    }

    /// The entries in their current order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Mutable access for ranking and id caching.
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<ScoreEntry> {
        &mut self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of `docid`, if present.
    pub fn score_of(&self, docid: DocId) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.docid == docid)
            .map(|e| e.score)
    }

    /// Keeps the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

impl FromIterator<(DocId, f64)> for ScoreList {
    fn from_iter<I: IntoIterator<Item = (DocId, f64)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(docid, score)| ScoreEntry::new(docid, score))
                .collect(),
        }
    }
}

/// The outcome of evaluating an operator: postings from a list operator, or scores from a score
/// operator. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// Produced by `Term`, `Syn`, `Near` and `Window`.
    List(InvertedList),
    /// Produced by every score operator.
    Scores(ScoreList),
}

impl EvaluationResult {
    /// Number of matching documents.
    pub fn len(&self) -> usize {
        match self {
            Self::List(list) => list.postings().len(),
            Self::Scores(scores) => scores.len(),
        }
    }

    /// Returns true if no document matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
