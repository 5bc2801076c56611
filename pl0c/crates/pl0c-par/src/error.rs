//! The single failure mode the parser can raise.

use pl0c_lex::Token;
use thiserror::Error;

/// Raised on any grammar violation. Carries the offending token and,
/// optionally, a description of what was expected instead.
///
/// The parser attempts no recovery: the first `TokenError` aborts parsing
/// and bubbles to the driver unrecovered.
#[derive(Debug, Error, Clone)]
#[error("Unexpected token '{spelling}' in line {line}, at {column}")]
pub struct TokenError {
    pub spelling: String,
    /// 1-based line, for human display.
    pub line: u32,
    /// 1-based column, for human display.
    pub column: u32,
    pub expected: Option<String>,
    pub found: Token,
}

impl TokenError {
    pub fn new(found: Token) -> Self {
        Self::build(found, None)
    }

    pub fn expected(found: Token, expected: impl Into<String>) -> Self {
        Self::build(found, Some(expected.into()))
    }

    fn build(found: Token, expected: Option<String>) -> Self {
        Self {
            spelling: found.kind.spelling(),
            line: found.span.line + 1,
            column: found.span.column + 1,
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl0c_lex::{Kind, Lexer};

    #[test]
    fn message_matches_human_readable_format() {
        let tokens: Vec<Token> = Lexer::new("var @").tokenize();
        let bad = tokens
            .iter()
            .copied()
            .find(|t| !matches!(t.kind, Kind::Word(_) | Kind::Eof))
            .unwrap_or_else(|| *tokens.last().unwrap());
        let err = TokenError::new(bad);
        assert!(err.to_string().starts_with("Unexpected token"));
    }
}
