//! In-memory index accessor.
//!
//! [`MemoryIndex`] holds the full positional index of a corpus in hash maps. It is built once by
//! a [`MemoryIndexBuilder`] and then shared read-only between evaluation threads.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use tracing::debug;

use crate::{
    AnalyzedToken, Analyzer, DocId, IndexAccessor, IndexError, InvertedList, Posting, TermCount,
    corpus::{SourceDocument, load_corpus},
};

/// Per-field statistics and postings.
#[derive(Debug, Default)]
struct FieldIndex {
    /// Postings per term, ordered by document id.
    postings: HashMap<String, Vec<Posting>>,
    /// Collection term frequency per term.
    ctf: HashMap<String, u64>,
    /// Token count per document; documents without the field are absent.
    doc_lengths: HashMap<DocId, u64>,
    /// Term counts per document, ordered by term.
    term_vectors: HashMap<DocId, Vec<(String, u32)>>,
    /// Token count across the collection.
    total_terms: u64,
}

/// A positional index held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    /// External ids by internal id.
    external_ids: Vec<String>,
    /// Internal ids by external id.
    internal_ids: HashMap<String, DocId>,
    /// Indexed fields by name.
    fields: HashMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Starts building an index.
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::default()
    }

    /// Loads a corpus file and indexes every document with `analyzer`.
    pub fn load(path: &Path, analyzer: &mut Analyzer) -> Result<Self, IndexError> {
        let documents = load_corpus(path)?;
        let mut builder = Self::builder();
        for doc in &documents {
            builder.add_document(doc, analyzer)?;
        }
        let index = builder.build();
        debug!(
            path = %path.display(),
            documents = index.external_ids.len(),
            fields = index.fields.len(),
            "loaded corpus"
        );
        Ok(index)
    }

    /// Checks that `docid` names a document.
    fn check_docid(&self, docid: DocId) -> Result<(), IndexError> {
        if (docid as usize) < self.external_ids.len() {
            Ok(())
        } else {
            Err(IndexError::UnknownDocument(docid))
        }
    }
}

impl IndexAccessor for MemoryIndex {
    fn postings(&self, term: &str, field: &str) -> Result<InvertedList, IndexError> {
        let postings = self
            .fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .cloned()
            .unwrap_or_default();
        Ok(InvertedList::from_postings(field, postings))
    }

    fn doc_length(&self, field: &str, docid: DocId) -> Result<u64, IndexError> {
        self.check_docid(docid)?;
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.doc_lengths.get(&docid))
            .copied()
            .unwrap_or(0))
    }

    fn total_term_count(&self, field: &str) -> Result<u64, IndexError> {
        Ok(self.fields.get(field).map_or(0, |f| f.total_terms))
    }

    fn doc_count(&self, field: &str) -> Result<u64, IndexError> {
        Ok(self.fields.get(field).map_or(0, |f| f.doc_lengths.len() as u64))
    }

    fn num_docs(&self) -> Result<u64, IndexError> {
        Ok(self.external_ids.len() as u64)
    }

    fn internal_id(&self, external_id: &str) -> Result<DocId, IndexError> {
        self.internal_ids
            .get(external_id)
            .copied()
            .ok_or_else(|| IndexError::NotFound(external_id.to_string()))
    }

    fn external_id(&self, docid: DocId) -> Result<String, IndexError> {
        self.external_ids
            .get(docid as usize)
            .cloned()
            .ok_or(IndexError::UnknownDocument(docid))
    }

    fn term_vector(&self, field: &str, docid: DocId) -> Result<Vec<TermCount>, IndexError> {
        self.check_docid(docid)?;
        let Some(field_index) = self.fields.get(field) else {
            return Ok(Vec::new());
        };
        let Some(terms) = field_index.term_vectors.get(&docid) else {
            return Ok(Vec::new());
        };
        Ok(terms
            .iter()
            .map(|(term, tf)| TermCount {
                term: term.clone(),
                tf: *tf,
                ctf: field_index.ctf.get(term).copied().unwrap_or(0),
            })
            .collect())
    }
}

/// Accumulates documents into a [`MemoryIndex`].
///
/// Internal ids are assigned densely in insertion order, starting at zero.
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    /// Index under construction.
    index: MemoryIndex,
}

impl MemoryIndexBuilder {
    /// Adds a corpus document, analyzing every field with `analyzer`.
    pub fn add_document(
        &mut self,
        doc: &SourceDocument,
        analyzer: &mut Analyzer,
    ) -> Result<DocId, IndexError> {
        let fields = doc
            .fields
            .iter()
            .map(|(name, text)| (name.clone(), analyzer.analyze(text)))
            .collect::<Vec<_>>();
        self.add_analyzed(&doc.id, fields)
    }

    /// Adds a document whose fields are already tokenized on whitespace. Positions count tokens
    /// from zero.
    pub fn add_tokens(&mut self, external_id: &str, fields: &[(&str, &str)]) -> Result<DocId, IndexError> {
        let fields = fields
            .iter()
            .map(|(name, text)| {
                let tokens = text
                    .split_whitespace()
                    .zip(0u32..)
                    .map(|(text, position)| AnalyzedToken {
                        text: text.to_string(),
                        position,
                    })
                    .collect();
                ((*name).to_string(), tokens)
            })
            .collect::<Vec<_>>();
        self.add_analyzed(external_id, fields)
    }

    /// Adds a document from analyzed tokens per field.
    ///
    /// Token positions within a field must be increasing.
    pub fn add_analyzed(
        &mut self,
        external_id: &str,
        fields: Vec<(String, Vec<AnalyzedToken>)>,
    ) -> Result<DocId, IndexError> {
        if self.index.internal_ids.contains_key(external_id) {
            return Err(IndexError::DuplicateDocument(external_id.to_string()));
        }
        let docid = DocId::try_from(self.index.external_ids.len())
            .map_err(|_| IndexError::UnknownDocument(DocId::MAX))?;

        self.index.external_ids.push(external_id.to_string());
        self.index.internal_ids.insert(external_id.to_string(), docid);

        for (name, tokens) in fields {
            if tokens.is_empty() {
                continue;
            }
            let field = self.index.fields.entry(name).or_default();
            index_field(field, docid, tokens);
        }

        Ok(docid)
    }

    /// Finishes the index.
    pub fn build(self) -> MemoryIndex {
        self.index
    }
}

/// Adds one document's tokens for a single field.
fn index_field(field: &mut FieldIndex, docid: DocId, tokens: Vec<AnalyzedToken>) {
    let length = tokens.len() as u64;
    let mut positions: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for token in tokens {
        positions.entry(token.text).or_default().push(token.position);
    }

    let mut vector = Vec::with_capacity(positions.len());
    for (term, term_positions) in positions {
        let tf = term_positions.len();
        *field.ctf.entry(term.clone()).or_default() += tf as u64;
        vector.push((term.clone(), u32::try_from(tf).unwrap_or(u32::MAX)));
        field
            .postings
            .entry(term)
            .or_default()
            .push(Posting::new(docid, term_positions));
    }

    field.term_vectors.insert(docid, vector);
    field.doc_lengths.insert(docid, length);
    field.total_terms += length;
}
