//! Corpus files.
//!
//! A corpus is either a JSON array of documents or a JSON-lines file (`.jsonl`) with one
//! document per line. Each document has an external `id` and a map from field name to text:
//!
//! ```json
//! {"id": "GX000-01", "fields": {"title": "Crab habitats", "body": "Crabs live in the ocean."}}
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::IndexError;

/// One document as it appears in a corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDocument {
    /// External document id.
    pub id: String,
    /// Raw text per field.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Reads all documents from a corpus file.
pub fn load_corpus(path: &Path) -> Result<Vec<SourceDocument>, IndexError> {
    let contents = fs::read_to_string(path)?;
    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        parse_json_lines(&contents, path)
    } else {
        serde_json::from_str(&contents).map_err(|source| IndexError::ParseCorpus {
            path: path.to_path_buf(),
            line: source.line(),
            source,
        })
    }
}

/// Parses JSON-lines content, skipping blank lines.
fn parse_json_lines(contents: &str, path: &Path) -> Result<Vec<SourceDocument>, IndexError> {
    let mut documents = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(line).map_err(|source| IndexError::ParseCorpus {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        documents.push(doc);
    }
    Ok(documents)
}
