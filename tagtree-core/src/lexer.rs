//! Line-oriented lexer.
//!
//! Input is pulled one line at a time from any [`BufRead`]. Every line has
//! its terminator (`\n`, `\r\n` or a lone `\r`) normalized to `\n`, and a
//! `\n` is appended to the final line even when the input lacks one. End of
//! input is "no current line".
//!
//! The lexer always holds one lookahead token ([`Lexer::current`]); the
//! parser drives it through [`Lexer::accept`], [`Lexer::expect`] and
//! [`Lexer::expect_kind`].

use std::io::BufRead;

use crate::error::{LexicalError, Result, StructuralError};
use crate::token::{Token, TokenKind};

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

#[inline]
fn is_symbol(c: char) -> bool {
    matches!(c, '<' | '>' | '/' | '?' | '=')
}

const QUOTE: char = '"';

/// Characters that may appear in an identifier token.
#[inline]
pub(crate) fn is_identifier_char(c: char) -> bool {
    !is_whitespace(c) && !is_symbol(c) && c != QUOTE
}

const COMMENT_END: &str = "-->";

pub struct Lexer<R> {
    reader: R,
    line: Option<Vec<char>>,
    pos: usize,
    line_no: usize,
    token: Token,
    eof_emitted: bool,
}

impl<'a> Lexer<&'a [u8]> {
    /// Lex an in-memory string.
    pub fn from_text(input: &'a str) -> Result<Self> {
        Lexer::new(input.as_bytes())
    }
}

impl<R: BufRead> Lexer<R> {
    /// Read the first line and prime the first token.
    pub fn new(reader: R) -> Result<Self> {
        let mut lexer = Lexer {
            reader,
            line: None,
            pos: 0,
            line_no: 0,
            token: Token::new(TokenKind::EndOfFile, "", 0),
            eof_emitted: false,
        };
        lexer.read_line()?;
        lexer.token = lexer.next_token()?;
        Ok(lexer)
    }

    /// The lookahead token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.token
    }

    /// Line number of the input line currently being scanned.
    #[inline]
    pub fn line(&self) -> usize {
        self.line_no
    }

    /// Move to the next token, returning the one that was current.
    pub fn advance(&mut self) -> Result<Token> {
        let next = self.next_token()?;
        Ok(std::mem::replace(&mut self.token, next))
    }

    /// Does the current token have this kind? Never consumes.
    #[inline]
    pub fn peek_is(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    /// Consume the current token if it is the symbol or identifier `value`.
    pub fn accept(&mut self, value: &str) -> Result<bool> {
        if self.token.is(value) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token, which must be the symbol or identifier `value`.
    pub fn expect(&mut self, value: &str) -> Result<()> {
        if self.accept(value)? {
            return Ok(());
        }
        Err(StructuralError::UnexpectedToken {
            expected: value.to_string(),
            found: self.token.to_string(),
            line: self.token.line,
        }
        .into())
    }

    /// Consume the current token, which must be of `kind`, and return its value.
    pub fn expect_kind(&mut self, kind: TokenKind) -> Result<String> {
        if self.token.kind != kind {
            return Err(StructuralError::UnexpectedKind {
                expected: kind,
                found: self.token.to_string(),
                line: self.token.line,
            }
            .into());
        }
        Ok(self.advance()?.value)
    }

    /// Consume the lexer as an iterator over the remaining tokens, ending
    /// with (and including) `EndOfFile`.
    pub fn tokens(self) -> Tokens<R> {
        Tokens {
            lexer: self,
            done: false,
        }
    }

    /// Scan the next token from the input.
    ///
    /// Fails with `UnexpectedEndOfFile` once `EndOfFile` has been produced.
    pub fn next_token(&mut self) -> Result<Token> {
        if self.eof_emitted {
            return Err(LexicalError::UnexpectedEndOfFile { line: self.line_no }.into());
        }

        self.skip_whitespace()?;
        let line = self.line_no;

        let token = match self.peek_char()? {
            None => {
                self.eof_emitted = true;
                Token::new(TokenKind::EndOfFile, "", line)
            }
            Some(c) if is_symbol(c) => {
                self.bump();
                if c == '<' && self.peek_char()? == Some('!') {
                    self.bump();
                    self.lex_comment(line)?
                } else {
                    Token::new(TokenKind::Symbol, c.to_string(), line)
                }
            }
            Some(QUOTE) => {
                self.bump();
                self.lex_quoted(line)?
            }
            Some(_) => self.lex_identifier(line)?,
        };

        log::trace!(target: "tagtree.lexer", "{:?} {:?} (line {})", token.kind, token.value, token.line);
        Ok(token)
    }

    // ---- Scanners ----

    fn lex_comment(&mut self, line: usize) -> Result<Token> {
        for _ in 0..2 {
            match self.peek_char()? {
                Some('-') => self.bump(),
                Some(_) => return Err(LexicalError::MalformedComment { line }.into()),
                None => return Err(LexicalError::UnterminatedComment { line }.into()),
            }
        }

        let mut text = String::new();
        loop {
            let Some(c) = self.peek_char()? else {
                return Err(LexicalError::UnterminatedComment { line }.into());
            };
            self.bump();
            text.push(c);
            if text.ends_with(COMMENT_END) {
                text.truncate(text.len() - COMMENT_END.len());
                return Ok(Token::new(TokenKind::Comment, text, line));
            }
        }
    }

    fn lex_quoted(&mut self, line: usize) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.peek_char()? {
                None => return Err(LexicalError::UnterminatedString { line }.into()),
                Some(QUOTE) => {
                    self.bump();
                    return Ok(Token::new(TokenKind::QuotedString, text, line));
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_identifier(&mut self, line: usize) -> Result<Token> {
        let mut text = String::new();
        while let Some(c) = self.peek_char()? {
            if !is_identifier_char(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        Ok(Token::new(TokenKind::Identifier, text, line))
    }

    // ---- Character cursor ----

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek_char()? {
            if !is_whitespace(c) {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    /// Character under the cursor, reading further lines as needed.
    /// `None` at end of input.
    fn peek_char(&mut self) -> Result<Option<char>> {
        loop {
            let available = match &self.line {
                None => return Ok(None),
                Some(line) => line.get(self.pos).copied(),
            };
            if available.is_some() {
                return Ok(available);
            }
            self.read_line()?;
        }
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn read_line(&mut self) -> Result<()> {
        let mut buf = String::new();
        self.pos = 0;
        if self.reader.read_line(&mut buf)? == 0 {
            self.line = None;
            return Ok(());
        }

        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        let mut chars: Vec<char> = buf
            .chars()
            .map(|c| if c == '\r' { '\n' } else { c })
            .collect();
        chars.push('\n');

        self.line = Some(chars);
        self.line_no += 1;
        Ok(())
    }
}

/// Iterator returned by [`Lexer::tokens`].
pub struct Tokens<R> {
    lexer: Lexer<R>,
    done: bool,
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.lexer.current().is_eof() {
            self.done = true;
            return Some(Ok(self.lexer.current().clone()));
        }
        match self.lexer.advance() {
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn lex(input: &str) -> Vec<(TokenKind, String)> {
        Lexer::from_text(input)
            .unwrap()
            .tokens()
            .map(|t| t.map(|t| (t.kind, t.value)))
            .collect::<Result<_>>()
            .unwrap()
    }

    fn sym(s: &str) -> (TokenKind, String) {
        (TokenKind::Symbol, s.to_string())
    }

    fn ident(s: &str) -> (TokenKind, String) {
        (TokenKind::Identifier, s.to_string())
    }

    #[test]
    fn test_element_tokens() {
        assert_eq!(
            lex(r#"<a x="1">"hi"</a>"#),
            vec![
                sym("<"),
                ident("a"),
                ident("x"),
                sym("="),
                (TokenKind::QuotedString, "1".into()),
                sym(">"),
                (TokenKind::QuotedString, "hi".into()),
                sym("<"),
                sym("/"),
                ident("a"),
                sym(">"),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_eof() {
        assert_eq!(lex(""), vec![(TokenKind::EndOfFile, String::new())]);
        assert_eq!(lex("  \n\t\r\n"), vec![(TokenKind::EndOfFile, String::new())]);
    }

    #[test]
    fn test_comment_replaces_open_angle() {
        assert_eq!(
            lex("<!-- a > b -->x"),
            vec![
                (TokenKind::Comment, " a > b ".into()),
                ident("x"),
                (TokenKind::EndOfFile, String::new()),
            ]
        );
    }

    #[test]
    fn test_empty_comment() {
        assert_eq!(lex("<!---->")[0], (TokenKind::Comment, String::new()));
    }

    #[test]
    fn test_multiline_comment_and_string() {
        let tokens = lex("<!--one\r\ntwo-->\"a\rb\r\nc\"");
        assert_eq!(tokens[0], (TokenKind::Comment, "one\ntwo".into()));
        assert_eq!(tokens[1], (TokenKind::QuotedString, "a\nb\nc".into()));
    }

    #[test]
    fn test_line_numbers() {
        let mut lexer = Lexer::from_text("<a>\n\n  b").unwrap();
        assert_eq!(lexer.current().line, 1);
        for _ in 0..3 {
            lexer.advance().unwrap();
        }
        assert_eq!(lexer.current().value, "b");
        assert_eq!(lexer.current().line, 3);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::from_text("\"abc").err().unwrap();
        assert!(matches!(
            err,
            Error::Lexical(LexicalError::UnterminatedString { line: 1 })
        ));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::from_text("<!-- never closed\n").err().unwrap();
        assert!(matches!(
            err,
            Error::Lexical(LexicalError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn test_malformed_comment() {
        let err = Lexer::from_text("<!DOCTYPE x>").err().unwrap();
        assert!(matches!(
            err,
            Error::Lexical(LexicalError::MalformedComment { .. })
        ));
    }

    #[test]
    fn test_advance_past_eof_fails() {
        let mut lexer = Lexer::from_text("x").unwrap();
        lexer.advance().unwrap();
        assert!(lexer.peek_is(TokenKind::EndOfFile));
        let err = lexer.advance().unwrap_err();
        assert!(matches!(
            err,
            Error::Lexical(LexicalError::UnexpectedEndOfFile { .. })
        ));
    }

    #[test]
    fn test_accept_ignores_quoted_lookalikes() {
        let mut lexer = Lexer::from_text("\"<\" <").unwrap();
        assert!(!lexer.accept("<").unwrap());
        assert_eq!(lexer.expect_kind(TokenKind::QuotedString).unwrap(), "<");
        assert!(lexer.accept("<").unwrap());
    }

    #[test]
    fn test_expect_reports_found_token() {
        let mut lexer = Lexer::from_text("b").unwrap();
        let err = lexer.expect(">").unwrap_err();
        match err {
            Error::Structural(StructuralError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, ">");
                assert_eq!(found, "b");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_expect_kind_mismatch() {
        let mut lexer = Lexer::from_text("=").unwrap();
        let err = lexer.expect_kind(TokenKind::Identifier).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::UnexpectedKind {
                expected: TokenKind::Identifier,
                ..
            })
        ));
    }
}
