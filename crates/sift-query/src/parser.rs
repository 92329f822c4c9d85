//! Query parser.
//!
//! Parses a token stream into a [`QueryNode`] tree with an explicit operator stack.
//!
//! # Grammar
//!
//! ```text
//! query     → argument*
//! argument  → TERM | OPERATOR "(" argument* ")"
//! weighted  → OPERATOR "(" (WEIGHT argument)* ")"      -- #wand, #wsum
//! TERM      → word ("." field)?                        -- field: url keywords title inlink body
//! ```
//!
//! The whole query is wrapped in an implicit root operator chosen by the retrieval model: `#or`
//! for the boolean models, `#sum` for BM25 and `#and` for Indri.
//!
//! Terms go through a [`TermAnalyzer`]; a term that analyzes to nothing (a stopword) is dropped
//! together with its weight, and so is an operator left without arguments.

use sift_config::{ModelFamily, RetrievalModel};
use sift_index::{Analyzer, DEFAULT_FIELD, FIELDS};

use crate::{
    ast::QueryNode,
    error::{ParseError, QueryError},
    lexer::{Lexeme, OperatorKind, Token, tokenize},
};

/// Normalizes query terms the same way documents were normalized.
pub trait TermAnalyzer {
    /// Analyzes a raw query term into index terms. Only the first one is used.
    fn analyze_term(&mut self, text: &str) -> Vec<String>;
}

impl TermAnalyzer for Analyzer {
    fn analyze_term(&mut self, text: &str) -> Vec<String> {
        self.terms(text)
    }
}

impl<F> TermAnalyzer for F
where
    F: FnMut(&str) -> Vec<String>,
{
    fn analyze_term(&mut self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Root operator wrapped around every query under `model`.
pub fn root_operator(model: &RetrievalModel) -> OperatorKind {
    match model.family() {
        ModelFamily::Boolean => OperatorKind::Or,
        ModelFamily::Bm25 => OperatorKind::Sum,
        ModelFamily::Indri => OperatorKind::And,
    }
}

/// An operator whose closing parenthesis has not been seen yet.
#[derive(Debug)]
struct Frame {
    /// The operator.
    op: OperatorKind,
    /// Byte position of the operator keyword.
    position: usize,
    /// Arguments collected so far.
    children: Vec<QueryNode>,
    /// Weights of the collected arguments, for weighted operators.
    weights: Vec<f64>,
    /// Weight read but not yet attached to an argument.
    pending_weight: Option<f64>,
}

impl Frame {
    /// Opens a frame for `op`.
    fn new(op: OperatorKind, position: usize) -> Self {
        Self {
            op,
            position,
            children: Vec::new(),
            weights: Vec::new(),
            pending_weight: None,
        }
    }

    /// Returns true if the next word is a weight rather than an argument.
    fn expects_weight(&self) -> bool {
        self.op.is_weighted() && self.pending_weight.is_none()
    }

    /// Attaches an argument, or drops the pending weight when the argument vanished.
    fn push(&mut self, node: Option<QueryNode>) {
        let weight = self.pending_weight.take();
        if let Some(node) = node {
            self.children.push(node);
            if let Some(weight) = weight {
                self.weights.push(weight);
            }
        }
    }

    /// Closes the frame. Returns `None` when no argument survived analysis.
    fn close(self) -> Result<Option<QueryNode>, ParseError> {
        if self.pending_weight.is_some() {
            return Err(ParseError::new(
                format!("{} has a weight without an argument", self.op),
                Some(self.position),
            ));
        }
        if self.children.is_empty() {
            return Ok(None);
        }
        if self.op.is_list_operator() {
            self.check_list_arguments()?;
        }

        let children = self.children;
        let node = match self.op {
            OperatorKind::And => QueryNode::And(children),
            OperatorKind::Or => QueryNode::Or(children),
            OperatorKind::Sum => QueryNode::Sum(children),
            OperatorKind::Syn => QueryNode::Syn(children),
            OperatorKind::Near(distance) => QueryNode::Near { distance, children },
            OperatorKind::Window(width) => QueryNode::Window { width, children },
            OperatorKind::WeightedAnd => QueryNode::WeightedAnd {
                children,
                weights: self.weights,
            },
            OperatorKind::WeightedSum => QueryNode::WeightedSum {
                children,
                weights: self.weights,
            },
        };
        Ok(Some(node))
    }

    /// Checks that a list operator's arguments are list operators over one field.
    fn check_list_arguments(&self) -> Result<(), ParseError> {
        if self.children.iter().any(|c| !c.is_list_operator()) {
            return Err(ParseError::new(
                format!("{} arguments must be terms or list operators", self.op),
                Some(self.position),
            ));
        }
        let first = self.children.first().and_then(QueryNode::field);
        if self.children.iter().any(|c| c.field() != first) {
            return Err(ParseError::new(
                format!("{} arguments must all search the same field", self.op),
                Some(self.position),
            ));
        }
        Ok(())
    }
}

/// Stack-based parser for structured queries.
struct Parser<'a, A: TermAnalyzer> {
    /// Token stream to parse.
    tokens: Vec<Lexeme>,
    /// Current position in token stream.
    position: usize,
    /// Length of the input, reported for errors at end of input.
    input_len: usize,
    /// Term normalization.
    analyzer: &'a mut A,
    /// The implicit root operator.
    root: Frame,
    /// Explicit operators still open, innermost last.
    open: Vec<Frame>,
}

impl<'a, A: TermAnalyzer> Parser<'a, A> {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Lexeme>, input_len: usize, root: OperatorKind, analyzer: &'a mut A) -> Self {
        Self {
            tokens,
            position: 0,
            input_len,
            analyzer,
            root: Frame::new(root, 0),
            open: Vec::new(),
        }
    }

    /// Parses the token stream into a query tree.
    fn parse(mut self) -> Result<Option<QueryNode>, ParseError> {
        while let Some(lexeme) = self.advance() {
            match lexeme.token {
                Token::Operator(op) => self.open_operator(op, lexeme.position)?,
                Token::RParen => self.close_operator(lexeme.position)?,
                Token::LParen => {
                    return Err(ParseError::new(
                        "unexpected '(' without an operator",
                        Some(lexeme.position),
                    ));
                }
                Token::Word(word) => self.word(&word, lexeme.position)?,
            }
        }

        if let Some(frame) = self.open.last() {
            return Err(ParseError::new(
                format!("missing closing parenthesis for {}", frame.op),
                Some(frame.position),
            ));
        }

        self.root.close()
    }

    /// Handles an operator keyword, which must be followed by `(`.
    fn open_operator(&mut self, op: OperatorKind, position: usize) -> Result<(), ParseError> {
        if self.top().expects_weight() {
            return Err(ParseError::new(
                format!("expected a weight before {op}"),
                Some(position),
            ));
        }
        match self.advance() {
            Some(Lexeme {
                token: Token::LParen,
                ..
            }) => {
                self.open.push(Frame::new(op, position));
                Ok(())
            }
            Some(other) => Err(ParseError::new(
                format!("expected '(' after {op}"),
                Some(other.position),
            )),
            None => Err(ParseError::new(
                format!("expected '(' after {op}"),
                Some(self.input_len),
            )),
        }
    }

    /// Handles `)`: closes the innermost operator and hands it to its parent.
    fn close_operator(&mut self, position: usize) -> Result<(), ParseError> {
        let Some(frame) = self.open.pop() else {
            return Err(ParseError::new(
                "unexpected closing parenthesis",
                Some(position),
            ));
        };
        let node = frame.close()?;
        self.top().push(node);
        Ok(())
    }

    /// Handles a bare word: a weight inside a weighted operator, otherwise a term.
    fn word(&mut self, word: &str, position: usize) -> Result<(), ParseError> {
        if self.top().expects_weight() {
            let weight = parse_weight(word).ok_or_else(|| {
                ParseError::new(format!("expected a weight, found '{word}'"), Some(position))
            })?;
            self.top().pending_weight = Some(weight);
            return Ok(());
        }

        let (text, field) = split_field(word);
        let node = self
            .analyzer
            .analyze_term(text)
            .into_iter()
            .next()
            .map(|term| QueryNode::term_in(term, field));
        self.top().push(node);
        Ok(())
    }

    /// The innermost open operator.
    fn top(&mut self) -> &mut Frame {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    /// Consumes and returns the next token.
    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.tokens.get(self.position).cloned();
        if lexeme.is_some() {
            self.position += 1;
        }
        lexeme
    }
}

/// Parses a weight: a finite, non-negative number.
fn parse_weight(word: &str) -> Option<f64> {
    word.parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}

/// Splits a `.field` suffix off a term. Words without a known suffix search the default field.
fn split_field(word: &str) -> (&str, &str) {
    for field in FIELDS {
        if let Some(text) = word
            .strip_suffix(field)
            .and_then(|rest| rest.strip_suffix('.'))
        {
            return (text, field);
        }
    }
    (word, DEFAULT_FIELD)
}

/// Parses a query under `model`, wrapping it in the model's root operator.
///
/// Returns `Ok(None)` when nothing survives analysis (an empty query, or only stopwords).
pub fn parse<A: TermAnalyzer>(
    input: &str,
    model: &RetrievalModel,
    analyzer: &mut A,
) -> Result<Option<QueryNode>, QueryError> {
    parse_with_root(input, root_operator(model), analyzer)
}

/// Parses a query wrapped in an explicit root operator.
pub fn parse_with_root<A: TermAnalyzer>(
    input: &str,
    root: OperatorKind,
    analyzer: &mut A,
) -> Result<Option<QueryNode>, QueryError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens, input.len(), root, analyzer)
        .parse()
        .map_err(|err| QueryError::from(err).with_query(input))
}
