//! Abstract syntax tree for PL/0.
//!
//! Modelled as closed sums rather than a class hierarchy: the set of node
//! shapes is fixed by the grammar, so every variant is enumerated up front
//! instead of left open for extension.

use pl0c_lex::Operator;
use pl0c_util::{Span, Symbol};

/// An arithmetic expression. Pure tree, no sharing.
#[derive(Clone, Debug)]
pub enum Expression {
    Number(i64, Span),
    Identifier(Symbol, Span),
    Binary(Box<Expression>, Operator, Box<Expression>, Span),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Number(_, span) => *span,
            Expression::Identifier(_, span) => *span,
            Expression::Binary(_, _, _, span) => *span,
        }
    }
}

/// A boolean condition: either `odd E` or `E relop E`.
#[derive(Clone, Debug)]
pub enum Condition {
    Odd(Expression, Span),
    Binary(Expression, Operator, Expression, Span),
}

impl Condition {
    pub fn span(&self) -> Span {
        match self {
            Condition::Odd(_, span) => *span,
            Condition::Binary(_, _, _, span) => *span,
        }
    }
}

/// A statement (called "sentence" in the source this was distilled from).
#[derive(Clone, Debug)]
pub enum Statement {
    Assign(Symbol, Expression, Span),
    Call(Symbol, Span),
    /// The then-branch may be absent (`if a=b then ;`).
    If(Condition, Option<Box<Statement>>, Span),
    While(Condition, Option<Box<Statement>>, Span),
    Compound(Vec<Statement>, Span),
    /// Read targets; non-empty by construction of the grammar rule.
    Read(Vec<Symbol>, Span),
    /// Write arguments; non-empty by construction of the grammar rule.
    Write(Vec<Expression>, Span),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign(_, _, span) => *span,
            Statement::Call(_, span) => *span,
            Statement::If(_, _, span) => *span,
            Statement::While(_, _, span) => *span,
            Statement::Compound(_, span) => *span,
            Statement::Read(_, span) => *span,
            Statement::Write(_, span) => *span,
        }
    }
}

/// `const a = 1, b = 2;` - an ordered list of (name, literal) pairs.
#[derive(Clone, Debug)]
pub struct Consts(pub Vec<(Symbol, i64)>);

/// `var a, b, c;` - an ordered list of names.
#[derive(Clone, Debug)]
pub struct Vars(pub Vec<Symbol>);

/// `procedure p; <subprogram>` - nests arbitrarily, but see [`Subprogram`]
/// for the flat global symbol space this variant of PL/0 actually uses.
#[derive(Clone, Debug)]
pub struct Procedure {
    pub name: Symbol,
    pub body: Subprogram,
}

/// A declaration block plus the statement it governs.
///
/// Every constant and variable declared anywhere becomes a global (at the
/// top level) or a stack slot (inside a procedure); every procedure becomes
/// a global function named after its identifier. Nesting is syntactic only.
#[derive(Clone, Debug)]
pub struct Subprogram {
    pub consts: Option<Consts>,
    pub vars: Option<Vars>,
    pub procedures: Vec<Procedure>,
    pub statement: Option<Statement>,
}

/// A complete compilation unit: a subprogram terminated by `.`.
#[derive(Clone, Debug)]
pub struct Program {
    pub subprogram: Subprogram,
}
