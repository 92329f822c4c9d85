//! Error types for query parsing.
//!
//! This module provides error types for lexing and parsing structured query expressions. Both
//! carry byte positions so the unified [`QueryError`] can point at the offending fragment.

use std::{error::Error, fmt};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message)?;
        writeln!(f, "  {}", self.input)?;
        write!(f, "  {}^", " ".repeat(self.position))
    }
}

impl Error for LexError {}

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Byte position of the offending token, if any.
    pub position: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(f, "at byte {}: {}", pos, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl Error for ParseError {}

/// A unified error type for query parsing.
///
/// This type provides detailed error messages with context, including
/// the original query string and position indicators where applicable.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Lexer error (tokenization failed).
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
    },
    /// Parser error (invalid syntax).
    Parse {
        /// Error message.
        message: String,
        /// Byte position in input (if available).
        position: Option<usize>,
    },
}

impl QueryError {
    /// Creates a lex error.
    pub fn lex(message: impl Into<String>, position: usize, query: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: message.into(),
                position,
            },
            query: Some(query.into()),
        }
    }

    /// Creates a parse error.
    pub fn parse(
        message: impl Into<String>,
        position: Option<usize>,
        query: Option<String>,
    ) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                position,
            },
            query,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } | QueryErrorKind::Parse { message, .. } => message,
        }
    }

    /// Returns the byte position of the offending fragment, if known.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex { position, .. } => Some(*position),
            QueryErrorKind::Parse { position, .. } => *position,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message();
        if message.contains("unknown operator") {
            Some("Valid operators are: #and, #or, #syn, #sum, #wand, #wsum, #near/N, #window/N")
        } else if message.contains("closing parenthesis") {
            Some("Add a closing parenthesis ) to match the opening one")
        } else if message.contains("expected '('") {
            Some("Operator arguments are enclosed in parentheses, e.g. '#and(crab ocean)'")
        } else if message.contains("weight") {
            Some("#wand and #wsum take a weight before each argument, e.g. '#wand(0.7 crab 0.3 ocean)'")
        } else if message.contains("':'") {
            Some("Query lines have the form 'id: query', e.g. '10: #and(crab ocean)'")
        } else {
            None
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query syntax error: {}", self.message())?;

        // If we have a query and position, show it with a pointer
        if let Some(query) = &self.query {
            write!(f, "\n  {}", query)?;
            if let Some(pos) = self.position() {
                let clamped = pos.min(query.len());
                write!(f, "\n  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message,
                position: err.position,
            },
            query: None,
        }
    }
}
