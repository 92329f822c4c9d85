//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of positioned tokens for the parser. Whitespace and
//! commas separate tokens; parentheses are tokens of their own. A word starting with `#` is an
//! operator keyword, matched case-insensitively.

use std::{fmt, iter::Peekable, str::Chars};

use crate::error::LexError;

/// A query operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `#and`
    And,
    /// `#or`
    Or,
    /// `#syn`
    Syn,
    /// `#sum`
    Sum,
    /// `#wand`
    WeightedAnd,
    /// `#wsum`
    WeightedSum,
    /// `#near/N`
    Near(u32),
    /// `#window/N`
    Window(u32),
}

impl OperatorKind {
    /// Returns true if every argument is preceded by a weight.
    pub fn is_weighted(self) -> bool {
        matches!(self, Self::WeightedAnd | Self::WeightedSum)
    }

    /// Returns true if the operator produces an inverted list rather than scores.
    pub fn is_list_operator(self) -> bool {
        matches!(self, Self::Syn | Self::Near(_) | Self::Window(_))
    }

    /// Keyword without its distance suffix.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "#and",
            Self::Or => "#or",
            Self::Syn => "#syn",
            Self::Sum => "#sum",
            Self::WeightedAnd => "#wand",
            Self::WeightedSum => "#wsum",
            Self::Near(_) => "#near",
            Self::Window(_) => "#window",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Near(n) | Self::Window(n) => write!(f, "{}/{}", self.keyword(), n),
            _ => f.write_str(self.keyword()),
        }
    }
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An operator keyword.
    Operator(OperatorKind),

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// A bare word: a term (optionally with a `.field` suffix) or a weight.
    Word(String),
}

/// A token with the byte position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token.
    pub token: Token,
    /// Byte position in the input.
    pub position: usize,
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Lexeme>, LexError> {
        self.skip_delimiters();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };
        let position = self.position;

        let token = match ch {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            _ => {
                let word = self.read_word();
                if word.starts_with('#') {
                    Token::Operator(self.operator(&word, position)?)
                } else {
                    Token::Word(word)
                }
            }
        };

        Ok(Some(Lexeme { token, position }))
    }

    /// Reads characters up to the next delimiter or parenthesis.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if is_delimiter(ch) || ch == '(' || ch == ')' {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    /// Resolves an operator keyword such as `#AND` or `#near/3`.
    fn operator(&self, word: &str, position: usize) -> Result<OperatorKind, LexError> {
        let lower = word.to_lowercase();
        let (name, suffix) = match lower.split_once('/') {
            Some((name, suffix)) => (name, Some(suffix)),
            None => (lower.as_str(), None),
        };

        let kind = match (name, suffix) {
            ("#and", None) => OperatorKind::And,
            ("#or", None) => OperatorKind::Or,
            ("#syn", None) => OperatorKind::Syn,
            ("#sum", None) => OperatorKind::Sum,
            ("#wand", None) => OperatorKind::WeightedAnd,
            ("#wsum", None) => OperatorKind::WeightedSum,
            ("#near", Some(n)) => OperatorKind::Near(self.distance(word, n, position)?),
            ("#window", Some(n)) => OperatorKind::Window(self.distance(word, n, position)?),
            ("#near" | "#window", None) => {
                return Err(self.error_at(
                    format!("{name} requires a distance, e.g. {name}/2"),
                    position,
                ));
            }
            _ => return Err(self.error_at(format!("unknown operator '{word}'"), position)),
        };

        Ok(kind)
    }

    /// Parses the `/N` suffix of a proximity operator.
    fn distance(&self, word: &str, suffix: &str, position: usize) -> Result<u32, LexError> {
        match suffix.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(self.error_at(
                format!("invalid distance in '{word}': expected a positive integer"),
                position,
            )),
        }
    }

    /// Skips whitespace and commas.
    fn skip_delimiters(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if is_delimiter(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Characters separating tokens.
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect()
    }

    fn word(s: &str) -> Token {
        Token::Word(s.into())
    }

    #[test]
    fn empty_input() {
        assert!(tokens("").is_empty());
        assert!(tokens(" ,\t ").is_empty());
    }

    #[test]
    fn bare_terms() {
        assert_eq!(tokens("crab ocean.title"), vec![word("crab"), word("ocean.title")]);
    }

    #[test]
    fn operators_and_parens() {
        assert_eq!(tokens("#AND(crab, #Syn(a b))"), vec![
            Token::Operator(OperatorKind::And),
            Token::LParen,
            word("crab"),
            Token::Operator(OperatorKind::Syn),
            Token::LParen,
            word("a"),
            word("b"),
            Token::RParen,
            Token::RParen,
        ]);
    }

    #[test]
    fn proximity_distances() {
        assert_eq!(tokens("#near/3 #WINDOW/12"), vec![
            Token::Operator(OperatorKind::Near(3)),
            Token::Operator(OperatorKind::Window(12)),
        ]);
    }

    #[test]
    fn weights_are_words() {
        assert_eq!(tokens("#wsum(0.3 a 0.7 b)"), vec![
            Token::Operator(OperatorKind::WeightedSum),
            Token::LParen,
            word("0.3"),
            word("a"),
            word("0.7"),
            word("b"),
            Token::RParen,
        ]);
    }

    #[test]
    fn byte_positions() {
        let lexemes = tokenize("#or( é b)").unwrap();
        let positions: Vec<usize> = lexemes.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 3, 5, 8, 9]);
    }

    #[test]
    fn unknown_operator() {
        let err = tokenize("#and(#foo(a))").unwrap_err();
        assert_eq!(err.position, 5);
        assert!(err.message.contains("#foo"));
    }

    #[test]
    fn invalid_distance() {
        assert!(tokenize("#near/0(a b)").is_err());
        assert!(tokenize("#near/x(a b)").is_err());
        assert!(tokenize("#window/-2(a b)").is_err());
        let err = tokenize("#near(a b)").unwrap_err();
        assert!(err.message.contains("requires a distance"));
    }

    #[test]
    fn operator_display() {
        assert_eq!(OperatorKind::Near(4).to_string(), "#near/4");
        assert_eq!(OperatorKind::WeightedAnd.to_string(), "#wand");
    }
}
