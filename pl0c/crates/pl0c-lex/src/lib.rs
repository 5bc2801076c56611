//! Tokenizer for PL/0 source text.
//!
//! Produces an ordered [`Token`] stream; consumed by `pl0c-par`. Whitespace
//! separates tokens and is otherwise insignificant, PL/0 has no comment
//! syntax, and lexing never fails - an unrecognized character simply ends
//! the stream early, leaving the parser to report the resulting gap as a
//! missing expected token.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Kind, Operator, Sign, Token};
