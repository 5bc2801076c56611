//! Source text to token stream.

use pl0c_util::span::FileId;
use pl0c_util::symbol::lookup_keyword;
use pl0c_util::{Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{Kind, Operator, Sign, Token};

/// Turns PL/0 source text into an ordered token stream.
///
/// On an unrecognized character the lexer stops silently (the rest of the
/// input is dropped) rather than raising an error; lexical validity beyond
/// "is this a two/one-character operator, a sign, or an alphanumeric run"
/// is not this stage's concern.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file_id: FileId,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file_id: FileId::DUMMY,
        }
    }

    pub fn with_file(source: &'a str, file_id: FileId) -> Self {
        Self {
            cursor: Cursor::new(source),
            file_id,
        }
    }

    fn span(&self, start: usize, start_line: u32, start_col: u32) -> Span {
        Span::with_file(start, self.cursor.position(), self.file_id, start_line, start_col)
    }

    /// Produces the next token. Returns `Token::Eof` at end of input or on
    /// an unrecognized character - lexing never fails outright.
    pub fn next_token(&mut self) -> Token {
        self.cursor.skip_whitespace();
        let start = self.cursor.position();
        let (line, col) = (self.cursor.line(), self.cursor.column());

        if self.cursor.is_at_end() {
            return Token::new(Kind::Eof, self.span(start, line, col));
        }

        let c0 = self.cursor.current_char();

        let c1 = self.cursor.char_at(1);
        if let Some(op) = Operator::from_two_chars(c0, c1) {
            self.cursor.advance();
            self.cursor.advance();
            return Token::new(Kind::Operator(op), self.span(start, line, col));
        }

        if let Some(sign) = Sign::from_char(c0) {
            self.cursor.advance();
            return Token::new(Kind::Sign(sign), self.span(start, line, col));
        }
        if let Some(op) = Operator::from_char(c0) {
            self.cursor.advance();
            return Token::new(Kind::Operator(op), self.span(start, line, col));
        }

        if c0.is_ascii_alphanumeric() {
            while !self.cursor.is_at_end() && self.cursor.current_char().is_ascii_alphanumeric() {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(start).to_ascii_lowercase();

            if let Ok(number) = text.parse::<i64>() {
                return Token::new(Kind::Number(number), self.span(start, line, col));
            }
            if let Some(keyword) = lookup_keyword(&text) {
                return Token::new(Kind::Word(keyword), self.span(start, line, col));
            }
            return Token::new(Kind::Ident(Symbol::intern(&text)), self.span(start, line, col));
        }

        // Unrecognized character: stop here, same as end of input.
        Token::new(Kind::Eof, self.span(start, line, col))
    }

    /// Collects every token up to and including the terminal `Eof`.
    ///
    /// An unrecognized character ends tokenization early (the remainder of
    /// the source is dropped) rather than producing an error.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, Kind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields tokens up to but excluding the terminal `Eof`.
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if matches!(token.kind, Kind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl0c_util::symbol::KW_ODD;

    fn kinds(src: &str) -> Vec<Kind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_signs_and_operators() {
        let got = kinds("const a = 1, b = 2; var x; odd x <= 10");
        assert_eq!(
            got,
            vec![
                Kind::Word(Symbol::intern("const")),
                Kind::Ident(Symbol::intern("a")),
                Kind::Operator(Operator::Eq),
                Kind::Number(1),
                Kind::Sign(Sign::Comma),
                Kind::Ident(Symbol::intern("b")),
                Kind::Operator(Operator::Eq),
                Kind::Number(2),
                Kind::Sign(Sign::Semicolon),
                Kind::Word(Symbol::intern("var")),
                Kind::Ident(Symbol::intern("x")),
                Kind::Sign(Sign::Semicolon),
                Kind::Word(KW_ODD),
                Kind::Ident(Symbol::intern("x")),
                Kind::Operator(Operator::LessEq),
                Kind::Number(10),
            ]
        );
    }

    #[test]
    fn two_char_operators_are_matched_before_one_char() {
        assert_eq!(
            kinds(":= <= >="),
            vec![
                Kind::Operator(Operator::Assign),
                Kind::Operator(Operator::LessEq),
                Kind::Operator(Operator::GreaterEq),
            ]
        );
    }

    #[test]
    fn keywords_are_whole_alphanumeric_runs() {
        // "beginner" must lex as one identifier, not `begin` + `ner`.
        assert_eq!(kinds("beginner"), vec![Kind::Ident(Symbol::intern("beginner"))]);
    }

    #[test]
    fn identifiers_and_keywords_are_lowercased() {
        assert_eq!(kinds("BEGIN End"), vec![Kind::Word(Symbol::intern("begin")), Kind::Word(Symbol::intern("end"))]);
        assert_eq!(kinds("FooBar"), vec![Kind::Ident(Symbol::intern("foobar"))]);
    }

    #[test]
    fn whitespace_only_input_has_no_tokens() {
        assert_eq!(kinds("   \n\t  "), vec![]);
    }

    #[test]
    fn unrecognized_character_silently_stops_tokenization() {
        // '@' is not a sign, operator, or alphanumeric start.
        assert_eq!(kinds("var x @ y"), vec![Kind::Word(Symbol::intern("var")), Kind::Ident(Symbol::intern("x"))]);
    }

    #[test]
    fn reports_zero_based_line_and_column() {
        let tokens: Vec<Token> = Lexer::new("a := 1;\n").collect();
        let number = tokens
            .iter()
            .find(|t| matches!(t.kind, Kind::Number(_)))
            .unwrap();
        assert_eq!(number.span.line, 0);
        assert_eq!(number.span.column, 5);
    }

    #[test]
    fn position_is_ignored_by_equality() {
        let a: Vec<Token> = Lexer::new("x").collect();
        let b: Vec<Token> = Lexer::new("   x").collect();
        assert_eq!(a, b);
    }

    #[test]
    fn tokenize_terminates_with_eof() {
        let tokens = Lexer::new("var x;").tokenize();
        assert_eq!(tokens.last().unwrap().kind, Kind::Eof);
    }
}
