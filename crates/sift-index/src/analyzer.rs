//! Text analysis pipeline for sift.
//!
//! Corpus text and query terms go through the same five-stage pipeline:
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `LowerCaser` - converts tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 4. `StopWordFilter` - removes tantivy's English stopwords (the short Lucene list)
//! 5. `Stemmer` - applies language-specific stemming
//!
//! Token positions are assigned by the tokenizer, so removed tokens leave gaps behind them.

use std::fmt;

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};

use crate::IndexError;

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
/// Returns an error if the language is not recognized.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(IndexError::InvalidLanguage(other.to_string())),
    }
}

/// Builds the sift text analyzer with the specified stemmer language.
///
/// Stopwords are always English; only the stemmer follows `language`.
pub fn build_analyzer(language: Language) -> Result<TextAnalyzer, IndexError> {
    let stopwords = StopWordFilter::new(Language::English)
        .ok_or_else(|| IndexError::NoStopwords("english".to_string()))?;

    Ok(TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(stopwords)
        .filter(Stemmer::new(language))
        .build())
}

/// A token produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Normalized term text.
    pub text: String,
    /// Position of the token in the original text, counting removed tokens.
    pub position: u32,
}

/// Owned text analyzer shared by corpus loading and query parsing.
///
/// Cloning is cheap enough to give each worker thread its own copy.
#[derive(Clone)]
pub struct Analyzer {
    /// Configured tantivy pipeline.
    inner: TextAnalyzer,
}

impl Analyzer {
    /// Creates an analyzer for a stemmer language name.
    pub fn new(language_name: &str) -> Result<Self, IndexError> {
        let language = parse_language(language_name)?;
        Ok(Self {
            inner: build_analyzer(language)?,
        })
    }

    /// Analyzes text into positioned tokens.
    pub fn analyze(&mut self, text: &str) -> Vec<AnalyzedToken> {
        let mut stream = self.inner.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            let token = stream.token();
            tokens.push(AnalyzedToken {
                text: token.text.clone(),
                position: u32::try_from(token.position).unwrap_or(u32::MAX),
            });
        }
        tokens
    }

    /// Analyzes text into terms, discarding positions.
    pub fn terms(&mut self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|t| t.text).collect()
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}
