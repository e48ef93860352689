//! Tokens produced by the lexer.
//!
//! Token values are owned strings: quoted strings and comments may span
//! several input lines, which are read one at a time and discarded.

use std::fmt;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// One of `<`, `>`, `/`, `?`, `=`.
    Symbol,
    /// A maximal run of characters that are not whitespace, symbols or `"`.
    Identifier,
    /// Text between double quotes, still escaped.
    QuotedString,
    /// Text between `<!--` and `-->`, still escaped.
    Comment,
    /// End of input.
    EndOfFile,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Identifier => "identifier",
            Self::QuotedString => "quoted string",
            Self::Comment => "comment",
            Self::EndOfFile => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified fragment of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// 1-based line the token started on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            line,
        }
    }

    /// True if this is markup (a symbol or identifier) spelled `value`.
    ///
    /// Quoted strings and comments never match, so a quoted `"<"` cannot be
    /// mistaken for a tag opener.
    #[inline]
    pub fn is(&self, value: &str) -> bool {
        matches!(self.kind, TokenKind::Symbol | TokenKind::Identifier) && self.value == value
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfFile => f.write_str("<end of file>"),
            TokenKind::QuotedString => write!(f, "\"{}\"", self.value),
            TokenKind::Comment => write!(f, "<!--{}-->", self.value),
            _ => f.write_str(&self.value),
        }
    }
}
