//! Postings and inverted lists.

use crate::DocId;

/// Occurrences of one term in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Internal document id.
    pub docid: DocId,
    /// Strictly increasing token positions.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Creates a posting from a document id and its sorted positions.
    pub fn new(docid: DocId, positions: Vec<u32>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Self { docid, positions }
    }

    /// Number of occurrences of the term in the document.
    pub fn term_freq(&self) -> u32 {
        u32::try_from(self.positions.len()).unwrap_or(u32::MAX)
    }
}

/// Postings of one term (or one proximity/synonym expression) in one field.
///
/// Postings are ordered strictly by document id. The collection term frequency is the sum of the
/// postings' term frequencies unless the list was fetched from an index that tracks it
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvertedList {
    /// Field the postings belong to.
    field: String,
    /// Postings ordered by document id.
    postings: Vec<Posting>,
    /// Total occurrences across all postings.
    collection_term_freq: u64,
}

impl InvertedList {
    /// Creates an empty list for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            postings: Vec::new(),
            collection_term_freq: 0,
        }
    }

    /// Creates a list from postings already ordered by document id.
    pub fn from_postings(field: impl Into<String>, postings: Vec<Posting>) -> Self {
        debug_assert!(postings.windows(2).all(|w| w[0].docid < w[1].docid));
        let collection_term_freq = postings.iter().map(|p| u64::from(p.term_freq())).sum();
        Self {
            field: field.into(),
            postings,
            collection_term_freq,
        }
    }

    /// Appends a posting. Its document id must exceed every id already in the list, and a
    /// posting without positions is ignored.
    pub fn append_posting(&mut self, docid: DocId, positions: Vec<u32>) {
        if positions.is_empty() {
            return;
        }
        debug_assert!(self.postings.last().is_none_or(|last| last.docid < docid));
        self.collection_term_freq += positions.len() as u64;
        self.postings.push(Posting::new(docid, positions));
    }

    /// Field the postings belong to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Postings ordered by document id.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Total occurrences of the term in the field.
    pub fn collection_term_freq(&self) -> u64 {
        self.collection_term_freq
    }

    /// Returns true if no document contains the term.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Consumes the list, returning its postings.
    pub fn into_postings(self) -> Vec<Posting> {
        self.postings
    }
}

/// One entry of a document's term vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCount {
    /// Term text.
    pub term: String,
    /// Occurrences in the document.
    pub tf: u32,
    /// Occurrences in the whole field.
    pub ctf: u64,
}
