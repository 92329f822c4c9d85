//! The read-only interface the evaluator uses to reach an index.

use crate::{DocId, IndexError, InvertedList, TermCount};

/// Read access to postings, document statistics and document ids.
///
/// Implementations are shared by every worker thread of a batch run, so they must be `Sync` and
/// must not mutate on read.
pub trait IndexAccessor: Sync {
    /// Postings of `term` in `field`. An unknown term or field yields an empty list.
    fn postings(&self, term: &str, field: &str) -> Result<InvertedList, IndexError>;

    /// Number of tokens indexed for `docid` in `field`.
    fn doc_length(&self, field: &str, docid: DocId) -> Result<u64, IndexError>;

    /// Number of tokens indexed in `field` across the collection.
    fn total_term_count(&self, field: &str) -> Result<u64, IndexError>;

    /// Number of documents with at least one token in `field`.
    fn doc_count(&self, field: &str) -> Result<u64, IndexError>;

    /// Number of documents in the collection.
    fn num_docs(&self) -> Result<u64, IndexError>;

    /// Maps an external document id to its internal id.
    fn internal_id(&self, external_id: &str) -> Result<DocId, IndexError>;

    /// Maps an internal document id to its external id.
    fn external_id(&self, docid: DocId) -> Result<String, IndexError>;

    /// Terms of `docid` in `field` with their document and collection frequencies, ordered by
    /// term.
    fn term_vector(&self, field: &str, docid: DocId) -> Result<Vec<TermCount>, IndexError>;
}
