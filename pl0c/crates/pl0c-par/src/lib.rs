//! Tokens to AST.
//!
//! Recursive-descent over PL/0's statement/declaration grammar, with two
//! embedded expression strategies: shunting yard for arithmetic and a
//! relation-operator split for conditions. No error recovery - the first
//! [`error::TokenError`] aborts parsing.

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{Condition, Consts, Expression, Procedure, Program, Statement, Subprogram, Vars};
pub use error::TokenError;
pub use parser::Parser;
