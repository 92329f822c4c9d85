//! Query file lines.

use crate::error::QueryError;

/// One `id: query` line of a query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLine {
    /// Query identifier, printed in the first column of the results.
    pub id: String,
    /// The query expression.
    pub text: String,
}

/// Splits a query line at its first `:`.
///
/// Both parts are trimmed; the id must not be empty.
pub fn parse_query_line(line: &str) -> Result<QueryLine, QueryError> {
    let Some((id, text)) = line.split_once(':') else {
        return Err(QueryError::parse(
            "missing ':' between query id and query",
            None,
            Some(line.to_string()),
        ));
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(QueryError::parse(
            "empty query id before ':'",
            Some(0),
            Some(line.to_string()),
        ));
    }

    Ok(QueryLine {
        id: id.to_string(),
        text: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_id_and_query() {
        let line = parse_query_line("10: #and(crab ocean)").unwrap();
        assert_eq!(line.id, "10");
        assert_eq!(line.text, "#and(crab ocean)");
    }

    #[test]
    fn splits_at_first_colon() {
        let line = parse_query_line(" 7 :crab:ocean ").unwrap();
        assert_eq!(line.id, "7");
        assert_eq!(line.text, "crab:ocean");
    }

    #[test]
    fn missing_colon() {
        let err = parse_query_line("10 crab").unwrap_err();
        assert!(err.message().contains("missing ':'"));
        assert!(err.to_string().contains("hint: Query lines"));
    }

    #[test]
    fn empty_id() {
        assert!(parse_query_line(" : crab").is_err());
    }
}
