//! Document-at-a-time cursors.
//!
//! A [`DaatCursor`] walks a docid-ordered slice (postings or score entries) of one operator
//! argument. Combining operators keep one cursor per argument and repeatedly consume the smallest
//! current docid.

use sift_index::{DocId, Posting};

use crate::ScoreEntry;

/// An entry ordered by document id.
pub trait DocEntry {
    /// Document id of the entry.
    fn docid(&self) -> DocId;
}

impl DocEntry for Posting {
    fn docid(&self) -> DocId {
        self.docid
    }
}

impl DocEntry for ScoreEntry {
    fn docid(&self) -> DocId {
        self.docid
    }
}

/// A position in a docid-ordered slice.
#[derive(Debug, Clone)]
pub struct DaatCursor<'a, E> {
    /// Entries ordered by docid.
    entries: &'a [E],
    /// Index of the next unconsumed entry.
    position: usize,
}

impl<'a, E: DocEntry> DaatCursor<'a, E> {
    /// Creates a cursor at the start of `entries`.
    pub fn new(entries: &'a [E]) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    /// The next unconsumed entry.
    pub fn current(&self) -> Option<&'a E> {
        self.entries.get(self.position)
    }

    /// Docid of the next unconsumed entry.
    pub fn docid(&self) -> Option<DocId> {
        self.current().map(DocEntry::docid)
    }

    /// Consumes the current entry.
    pub fn advance(&mut self) {
        if self.position < self.entries.len() {
            self.position += 1;
        }
    }

    /// Skips entries below `docid`. Returns the entry for `docid` if present, without
    /// consuming it.
    pub fn skip_to(&mut self, docid: DocId) -> Option<&'a E> {
        while self.docid().is_some_and(|d| d < docid) {
            self.position += 1;
        }
        self.current().filter(|e| e.docid() == docid)
    }

    /// Consumes and returns the current entry if it belongs to `docid`.
    pub fn take(&mut self, docid: DocId) -> Option<&'a E> {
        let entry = self.current().filter(|e| e.docid() == docid)?;
        self.position += 1;
        Some(entry)
    }
}

/// Smallest current docid among the cursors, or `None` when all are exhausted.
pub fn min_docid<E: DocEntry>(cursors: &[DaatCursor<'_, E>]) -> Option<DocId> {
    cursors.iter().filter_map(DaatCursor::docid).min()
}
