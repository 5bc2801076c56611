//! Recursive-descent parser with shunting-yard expression parsing.

use pl0c_lex::{Kind, Operator, Sign, Token};
use pl0c_util::symbol::{KW_CALL, KW_CONST, KW_DO, KW_IF, KW_ODD, KW_PROCEDURE, KW_THEN, KW_VAR, KW_WHILE};
use pl0c_util::{Span, Symbol};

use crate::ast::*;
use crate::error::TokenError;

/// Parses an already-tokenized PL/0 source into a [`Program`].
///
/// `tokens` must end with `Token::Eof` (what [`pl0c_lex::Lexer::tokenize`]
/// produces) - the parser never advances past it, so a truncated slice
/// without a terminal `Eof` would make the last real token un-advanceable.
pub struct Parser<'t> {
    tokens: &'t [Token],
    index: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> Token {
        self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn previous(&self) -> Token {
        self.tokens[self.index.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous().span)
    }

    fn is_word(&self, kw: Symbol) -> bool {
        matches!(self.current().kind, Kind::Word(s) if s == kw)
    }

    fn is_sign(&self, sign: Sign) -> bool {
        matches!(self.current().kind, Kind::Sign(s) if s == sign)
    }

    fn is_operator(&self, op: Operator) -> bool {
        matches!(self.current().kind, Kind::Operator(o) if o == op)
    }

    fn is_eof(&self) -> bool {
        matches!(self.current().kind, Kind::Eof)
    }

    fn expect_sign(&mut self, sign: Sign) -> Result<(), TokenError> {
        if self.is_sign(sign) {
            self.advance();
            Ok(())
        } else {
            Err(TokenError::expected(self.current(), format!("'{}'", sign.spelling())))
        }
    }

    fn expect_word(&mut self, kw: Symbol, name: &str) -> Result<(), TokenError> {
        if self.is_word(kw) {
            self.advance();
            Ok(())
        } else {
            Err(TokenError::expected(self.current(), format!("'{name}'")))
        }
    }

    fn expect_operator(&mut self, op: Operator) -> Result<(), TokenError> {
        if self.is_operator(op) {
            self.advance();
            Ok(())
        } else {
            Err(TokenError::expected(self.current(), format!("'{}'", op.spelling())))
        }
    }

    fn parse_identifier(&mut self) -> Result<Symbol, TokenError> {
        match self.current().kind {
            Kind::Ident(sym) => {
                self.advance();
                Ok(sym)
            }
            _ => Err(TokenError::expected(self.current(), "identifier")),
        }
    }

    fn parse_number(&mut self) -> Result<i64, TokenError> {
        match self.current().kind {
            Kind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(TokenError::expected(self.current(), "number")),
        }
    }

    fn consume_comma_if_present(&mut self) {
        if self.is_sign(Sign::Comma) {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, TokenError> {
        let subprogram = self.parse_subprogram()?;
        self.expect_sign(Sign::Period)?;
        Ok(Program { subprogram })
    }

    fn parse_subprogram(&mut self) -> Result<Subprogram, TokenError> {
        let consts = self.parse_consts()?;
        let vars = self.parse_vars()?;

        let mut procedures = Vec::new();
        while let Some(procedure) = self.parse_procedure()? {
            procedures.push(procedure);
        }

        let statement = self.parse_statement()?;
        Ok(Subprogram {
            consts,
            vars,
            procedures,
            statement,
        })
    }

    fn parse_consts(&mut self) -> Result<Option<Consts>, TokenError> {
        if !self.is_word(KW_CONST) {
            return Ok(None);
        }
        self.advance();

        let mut entries = Vec::new();
        while !self.is_sign(Sign::Semicolon) {
            let name = self.parse_identifier()?;
            self.expect_operator(Operator::Eq)?;
            let value = self.parse_number()?;
            self.consume_comma_if_present();
            entries.push((name, value));
        }
        self.advance();
        Ok(Some(Consts(entries)))
    }

    fn parse_vars(&mut self) -> Result<Option<Vars>, TokenError> {
        if !self.is_word(KW_VAR) {
            return Ok(None);
        }
        self.advance();

        let mut names = Vec::new();
        while !self.is_sign(Sign::Semicolon) {
            names.push(self.parse_identifier()?);
            self.consume_comma_if_present();
        }
        self.advance();
        Ok(Some(Vars(names)))
    }

    fn parse_procedure(&mut self) -> Result<Option<Procedure>, TokenError> {
        if !self.is_word(KW_PROCEDURE) {
            return Ok(None);
        }
        self.advance();
        let name = self.parse_identifier()?;
        self.expect_sign(Sign::Semicolon)?;
        let body = self.parse_subprogram()?;
        Ok(Some(Procedure { name, body }))
    }

    /// Tries each statement alternative in turn, mirroring the grammar's own
    /// dispatch order. A lone `;` is absorbed silently, which is what lets
    /// constructs like `if m<=n then ;` parse.
    fn parse_statement(&mut self) -> Result<Option<Statement>, TokenError> {
        if let Some(stmt) = self.try_assign()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_if()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_while()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_call()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_compound()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_read()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.try_write()? {
            return Ok(Some(stmt));
        }
        if self.is_sign(Sign::Semicolon) {
            self.advance();
        }
        Ok(None)
    }

    fn try_assign(&mut self) -> Result<Option<Statement>, TokenError> {
        let is_assign = matches!(self.current().kind, Kind::Ident(_))
            && matches!(
                self.tokens.get(self.index + 1).map(|t| t.kind),
                Some(Kind::Operator(Operator::Assign))
            );
        if !is_assign {
            return Ok(None);
        }

        let start = self.current().span;
        let name = self.parse_identifier()?;
        self.advance(); // ':='

        let expr_tokens = self.collect_until(&[Sign::Semicolon]);
        self.advance(); // ';'

        let expression = Self::parse_expression_tokens(&expr_tokens)?;
        let span = start.to(expression.span());
        Ok(Some(Statement::Assign(name, expression, span)))
    }

    fn try_if(&mut self) -> Result<Option<Statement>, TokenError> {
        if !self.is_word(KW_IF) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();

        let condition_tokens = self.collect_until_word(KW_THEN);
        self.advance(); // 'then'

        let condition = Self::parse_condition_tokens(&condition_tokens)?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(Some(Statement::If(condition, body.map(Box::new), span)))
    }

    fn try_while(&mut self) -> Result<Option<Statement>, TokenError> {
        if !self.is_word(KW_WHILE) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();

        let condition_tokens = self.collect_until_word(KW_DO);
        self.advance(); // 'do'

        let condition = Self::parse_condition_tokens(&condition_tokens)?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(Some(Statement::While(condition, body.map(Box::new), span)))
    }

    fn try_call(&mut self) -> Result<Option<Statement>, TokenError> {
        if !self.is_word(KW_CALL) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();
        let name = self.parse_identifier()?;
        self.expect_sign(Sign::Semicolon)?;
        Ok(Some(Statement::Call(name, self.span_from(start))))
    }

    fn try_compound(&mut self) -> Result<Option<Statement>, TokenError> {
        use pl0c_util::symbol::KW_BEGIN;
        use pl0c_util::symbol::KW_END;

        if !self.is_word(KW_BEGIN) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();

        let mut statements = Vec::new();
        let mut statement = self.parse_statement()?;
        while !self.is_word(KW_END) && statement.is_some() {
            statements.push(statement.take().unwrap());
            statement = self.parse_statement()?;
        }
        if let Some(stmt) = statement {
            statements.push(stmt);
        }

        self.expect_word(KW_END, "end")?;
        Ok(Some(Statement::Compound(statements, self.span_from(start))))
    }

    fn try_read(&mut self) -> Result<Option<Statement>, TokenError> {
        use pl0c_util::symbol::KW_READ;

        if !self.is_word(KW_READ) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();
        self.expect_sign(Sign::LParen)?;

        let mut names = Vec::new();
        while !self.is_sign(Sign::RParen) {
            names.push(self.parse_identifier()?);
            self.consume_comma_if_present();
        }
        self.advance(); // ')'
        self.expect_sign(Sign::Semicolon)?;

        Ok(Some(Statement::Read(names, self.span_from(start))))
    }

    fn try_write(&mut self) -> Result<Option<Statement>, TokenError> {
        use pl0c_util::symbol::KW_WRITE;

        if !self.is_word(KW_WRITE) {
            return Ok(None);
        }
        let start = self.current().span;
        self.advance();
        self.expect_sign(Sign::LParen)?;

        let mut expressions = Vec::new();
        while !self.is_sign(Sign::RParen) {
            let tokens = self.collect_until(&[Sign::Comma, Sign::RParen]);
            if self.is_sign(Sign::Comma) {
                self.advance();
            }
            expressions.push(Self::parse_expression_tokens(&tokens)?);
        }
        self.advance(); // ')'
        self.expect_sign(Sign::Semicolon)?;

        Ok(Some(Statement::Write(expressions, self.span_from(start))))
    }

    /// Collects tokens up to (but not consuming) the first token matching
    /// any sign in `terminators`.
    fn collect_until(&mut self, terminators: &[Sign]) -> Vec<Token> {
        let mut collected = Vec::new();
        while !self.is_eof() && !terminators.iter().any(|s| self.is_sign(*s)) {
            collected.push(self.current());
            self.advance();
        }
        collected
    }

    /// Collects tokens up to (but not consuming) the given keyword.
    fn collect_until_word(&mut self, kw: Symbol) -> Vec<Token> {
        let mut collected = Vec::new();
        while !self.is_eof() && !self.is_word(kw) {
            collected.push(self.current());
            self.advance();
        }
        collected
    }

    /// Dijkstra's shunting yard: operand stack plus operator stack, driven
    /// by `Operator::precedence`. Equal precedence pops before pushing,
    /// which gives left-associativity.
    fn parse_expression_tokens(tokens: &[Token]) -> Result<Expression, TokenError> {
        let mut operands: Vec<Expression> = Vec::new();
        let mut operators: Vec<ShuntingOp> = Vec::new();

        fn apply(operands: &mut Vec<Expression>, op: Operator, op_span: Span) {
            let rhs = operands.pop().expect("shunting yard: missing rhs operand");
            let lhs = operands.pop().expect("shunting yard: missing lhs operand");
            let span = lhs.span().to(rhs.span()).to(op_span);
            operands.push(Expression::Binary(Box::new(lhs), op, Box::new(rhs), span));
        }

        for token in tokens {
            match token.kind {
                Kind::Number(n) => operands.push(Expression::Number(n, token.span)),
                Kind::Ident(sym) => operands.push(Expression::Identifier(sym, token.span)),
                Kind::Sign(Sign::LParen) => operators.push(ShuntingOp::LParen),
                Kind::Sign(Sign::RParen) => {
                    while let Some(top) = operators.last() {
                        match top {
                            ShuntingOp::LParen => break,
                            ShuntingOp::Binary(op, span) => {
                                let (op, span) = (*op, *span);
                                operators.pop();
                                apply(&mut operands, op, span);
                            }
                        }
                    }
                    operators.pop();
                }
                Kind::Operator(op) => {
                    let Some(prec) = op.precedence() else {
                        return Err(TokenError::expected(*token, "arithmetic operator"));
                    };
                    while let Some(ShuntingOp::Binary(top_op, _)) = operators.last() {
                        if top_op.precedence().expect("non-arithmetic operator on stack") >= prec {
                            let ShuntingOp::Binary(top_op, top_span) = operators.pop().unwrap() else {
                                unreachable!()
                            };
                            apply(&mut operands, top_op, top_span);
                        } else {
                            break;
                        }
                    }
                    operators.push(ShuntingOp::Binary(op, token.span));
                }
                _ => return Err(TokenError::expected(*token, "expression")),
            }
        }

        while let Some(op) = operators.pop() {
            match op {
                ShuntingOp::Binary(op, span) => apply(&mut operands, op, span),
                ShuntingOp::LParen => {}
            }
        }

        operands.pop().ok_or_else(|| {
            let fallback = tokens.first().copied().unwrap_or(Token::new(Kind::Eof, Span::DUMMY));
            TokenError::expected(fallback, "expression")
        })
    }

    /// `odd E`, or `E relop E` found by splitting at the first top-level
    /// relational operator (respecting parenthesis balance).
    fn parse_condition_tokens(tokens: &[Token]) -> Result<Condition, TokenError> {
        let Some(first) = tokens.first() else {
            return Err(TokenError::expected(
                Token::new(Kind::Eof, Span::DUMMY),
                "condition",
            ));
        };

        if matches!(first.kind, Kind::Word(sym) if sym == KW_ODD) {
            let expression = Self::parse_expression_tokens(&tokens[1..])?;
            let span = first.span.to(expression.span());
            return Ok(Condition::Odd(expression, span));
        }

        match Self::split_at_relational(tokens) {
            Some((lhs_tokens, op, op_span, rhs_tokens)) => {
                let lhs = Self::parse_expression_tokens(lhs_tokens)?;
                let rhs = Self::parse_expression_tokens(rhs_tokens)?;
                let span = lhs.span().to(rhs.span()).to(op_span);
                Ok(Condition::Binary(lhs, op, rhs, span))
            }
            None => Err(TokenError::expected(*first, "relational operator")),
        }
    }

    fn split_at_relational(tokens: &[Token]) -> Option<(&[Token], Operator, Span, &[Token])> {
        let mut depth: i32 = 0;
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                Kind::Sign(Sign::LParen) => depth += 1,
                Kind::Sign(Sign::RParen) => depth -= 1,
                Kind::Operator(op) if depth == 0 && op.is_relational() => {
                    return Some((&tokens[..i], op, token.span, &tokens[i + 1..]));
                }
                _ => {}
            }
        }
        None
    }
}

/// Operator-stack entries for the shunting-yard expression parser.
enum ShuntingOp {
    LParen,
    Binary(Operator, Span),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl0c_lex::Lexer;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize();
        Parser::new(&tokens).parse_program().expect("parse failed")
    }

    #[test]
    fn operator_precedence() {
        let tokens = Lexer::new("1+2*3").tokenize();
        let expr = Parser::parse_expression_tokens(&tokens[..tokens.len() - 1]).unwrap();
        match expr {
            Expression::Binary(lhs, Operator::Plus, rhs, _) => {
                assert!(matches!(*lhs, Expression::Number(1, _)));
                assert!(matches!(*rhs, Expression::Binary(_, Operator::Star, _, _)));
            }
            other => panic!("expected top-level +, got {other:?}"),
        }
    }

    #[test]
    fn left_associativity() {
        let tokens = Lexer::new("a-b-c").tokenize();
        let expr = Parser::parse_expression_tokens(&tokens[..tokens.len() - 1]).unwrap();
        match expr {
            Expression::Binary(lhs, Operator::Minus, rhs, _) => {
                assert!(matches!(*rhs, Expression::Identifier(_, _)));
                assert!(matches!(*lhs, Expression::Binary(_, Operator::Minus, _, _)));
            }
            other => panic!("expected top-level -, got {other:?}"),
        }
    }

    #[test]
    fn parenthesization_changes_shape() {
        let grouped = Lexer::new("(a+b)*c").tokenize();
        let flat = Lexer::new("a+b*c").tokenize();
        let grouped = Parser::parse_expression_tokens(&grouped[..grouped.len() - 1]).unwrap();
        let flat = Parser::parse_expression_tokens(&flat[..flat.len() - 1]).unwrap();
        assert!(matches!(grouped, Expression::Binary(_, Operator::Star, _, _)));
        assert!(matches!(flat, Expression::Binary(_, Operator::Plus, _, _)));
    }

    #[test]
    fn empty_then_branch_parses() {
        let program = parse("if a=b then ; .");
        match program.subprogram.statement {
            Some(Statement::If(_, body, _)) => assert!(body.is_none()),
            other => panic!("expected If statement, got {other:?}"),
        }
    }

    #[test]
    fn if_with_write_body() {
        let program = parse("if a=b then write(a);.");
        match program.subprogram.statement {
            Some(Statement::If(Condition::Binary(_, Operator::Eq, _, _), Some(body), _)) => {
                assert!(matches!(*body, Statement::Write(_, _)));
            }
            other => panic!("unexpected AST: {other:?}"),
        }
    }

    #[test]
    fn assign_with_parenthesized_expression() {
        let program = parse("var x,a,b,c,d; x := (a+b)*(c-d);.");
        match program.subprogram.statement {
            Some(Statement::Assign(_, Expression::Binary(_, Operator::Star, _, _), _)) => {}
            other => panic!("unexpected AST: {other:?}"),
        }
    }

    #[test]
    fn number_token_reports_expected_column() {
        let tokens = Lexer::new("a := 1;\n").tokenize();
        let number = tokens.iter().find(|t| matches!(t.kind, Kind::Number(_))).unwrap();
        assert_eq!(number.span.line, 0);
        assert_eq!(number.span.column, 5);
    }

    #[test]
    fn compound_needs_no_separator_beyond_each_statements_own_semicolon() {
        let program = parse("begin write(1); write(2); end.");
        match program.subprogram.statement {
            Some(Statement::Compound(stmts, _)) => assert_eq!(stmts.len(), 2),
            other => panic!("unexpected AST: {other:?}"),
        }
    }

    #[test]
    fn unexpected_token_is_a_parse_error() {
        let tokens = Lexer::new("const a = ;").tokenize();
        let err = Parser::new(&tokens).parse_program().unwrap_err();
        assert!(err.expected.is_some());
    }
}
