//! Error taxonomy.
//!
//! Two tiers mirror where a failure is detected:
//!
//! - [`LexicalError`] - the character stream could not be split into tokens
//!   (input ended inside a quoted string or comment, malformed `<!` opener).
//! - [`StructuralError`] - the tokens or the tree violate the grammar or an
//!   API contract (mismatched tags, unexpected token, missing or malformed
//!   attribute, invalid name, failed lookup, nesting past the parser's
//!   depth limit).
//!
//! I/O failures while reading or writing a file surface as [`Error::Io`].
//! Every error aborts the operation that raised it; nothing is retried.

use thiserror::Error;

use crate::token::TokenKind;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by every fallible operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures raised while tokenizing.
    pub fn is_lexical(&self) -> bool {
        matches!(self, Error::Lexical(_))
    }

    /// True for grammar and API contract violations.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural(_))
    }

    /// The structural error, if this is one.
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            Error::Structural(e) => Some(e),
            _ => None,
        }
    }

    /// The lexical error, if this is one.
    pub fn as_lexical(&self) -> Option<&LexicalError> {
        match self {
            Error::Lexical(e) => Some(e),
            _ => None,
        }
    }
}

/// Malformed token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
    /// A token was requested after `EndOfFile` had already been produced.
    #[error("unexpected end of file (line {line})")]
    UnexpectedEndOfFile { line: usize },

    /// Input ended before the closing `"`.
    #[error("unterminated quoted string starting on line {line}")]
    UnterminatedString { line: usize },

    /// Input ended before `-->`.
    #[error("unterminated comment starting on line {line}")]
    UnterminatedComment { line: usize },

    /// `<!` was not followed by `--`.
    #[error("malformed comment opener on line {line}, expected `<!--`")]
    MalformedComment { line: usize },
}

/// Grammar or semantic violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("expected `{expected}` but found `{found}` (line {line})")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("expected {expected} but found `{found}` (line {line})")]
    UnexpectedKind {
        expected: TokenKind,
        found: String,
        line: usize,
    },

    #[error("element <{opened}> closed by </{closed}> (line {line})")]
    TagMismatch {
        opened: String,
        closed: String,
        line: usize,
    },

    #[error("input contains no root element")]
    MissingRoot,

    #[error("missing required attribute `{name}`")]
    MissingAttribute { name: String },

    #[error("attribute `{name}` has value `{value}` which is not a valid {expected_type}")]
    InvalidFormat {
        name: String,
        value: String,
        expected_type: &'static str,
    },

    #[error("invalid name `{name}`: names must read back as a single identifier")]
    InvalidName { name: String },

    #[error("no child matching `{name}`")]
    NotFound { name: String },

    #[error("cannot attach element: {reason}")]
    InvalidAttach { reason: &'static str },

    #[error("no factory registered for class `{name}`")]
    UnknownClass { name: String },

    #[error("elements nested deeper than {limit} levels (line {line})")]
    TooDeep { limit: usize, line: usize },

    #[error("{id} is not a live element of this document")]
    UnknownElement { id: String },

    #[error("element arena is full")]
    ArenaFull,
}
