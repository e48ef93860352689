//! Recursive-descent parser.
//!
//! ```text
//! Document   := {Comment} [Header] {Comment} Element
//! Header     := '<' '?' {AnyToken} '>'
//! Element    := '<' Identifier {Attribute} '>' Body* '<' '/' Identifier '>'
//! Attribute  := Identifier '=' QuotedString
//! Body       := QuotedString | Comment | Element | Header | AnyOtherToken
//! ```
//!
//! A comment is held as pending and attached to the next element that is
//! opened. Any token in a body that is not one of the above is appended to
//! the contents as literal text.
//!
//! The first error aborts the parse; no partial document is returned. Only
//! the first root element is read; whatever follows it is ignored.
//!
//! Each nesting level costs two stack frames, so nesting is capped at
//! [`MAX_DEPTH`] levels (adjustable with [`Parser::with_max_depth`]); deeper
//! input fails with `TooDeep`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result, StructuralError};
use crate::escape::unescape;
use crate::lexer::Lexer;
use crate::token::TokenKind;
use crate::tree::{Document, ElementId};

/// Default nesting limit, counting the root as level 1.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<R> {
    lexer: Lexer<R>,
    doc: Document,
    pending_comment: Option<String>,
    max_depth: usize,
}

impl<'a> Parser<&'a [u8]> {
    pub fn from_text(input: &'a str) -> Result<Self> {
        Parser::new(input.as_bytes())
    }
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Parser {
            lexer: Lexer::new(reader)?,
            doc: Document::empty(),
            pending_comment: None,
            max_depth: MAX_DEPTH,
        })
    }

    /// Set the nesting limit. Keep it well inside the thread's stack.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse one root element and return the document.
    ///
    /// Comments and headers before the root are consumed; other stray tokens
    /// are skipped. Fails with `MissingRoot` if the input ends first.
    pub fn parse(mut self) -> Result<Document> {
        loop {
            let token = self.lexer.current();
            if token.is_eof() {
                return Err(StructuralError::MissingRoot.into());
            }
            if token.kind == TokenKind::Comment {
                let comment = self.lexer.advance()?;
                self.pending_comment = Some(comment.value);
            } else if self.lexer.accept("<")? {
                if let Some(root) = self.parse_element(1)? {
                    debug_assert_eq!(root, self.doc.root());
                    return Ok(self.doc);
                }
            } else {
                self.lexer.advance()?;
            }
        }
    }

    /// Parse an element whose `<` has already been consumed.
    ///
    /// Returns `None` if the `<` opened a header instead. `depth` is the
    /// nesting level of the element, 1 for the root.
    fn parse_element(&mut self, depth: usize) -> Result<Option<ElementId>> {
        if self.lexer.accept("?")? {
            self.skip_header()?;
            return Ok(None);
        }
        if depth > self.max_depth {
            return Err(StructuralError::TooDeep {
                limit: self.max_depth,
                line: self.lexer.current().line,
            }
            .into());
        }

        let tag_name = self.lexer.expect_kind(TokenKind::Identifier)?;
        let id = self.doc.create_element(&tag_name)?;

        if let Some(comment) = self.pending_comment.take() {
            log::trace!(target: "tagtree.parser", "attaching comment to <{}>", tag_name);
            self.doc.element_mut(id).set_comment(unescape(&comment));
        }

        while self.lexer.peek_is(TokenKind::Identifier) {
            let name = self.lexer.expect_kind(TokenKind::Identifier)?;
            self.lexer.expect("=")?;
            let value = self.lexer.expect_kind(TokenKind::QuotedString)?;
            self.doc.element_mut(id).add_attribute(&name, unescape(&value))?;
        }
        self.lexer.expect(">")?;

        self.parse_body(id, depth)?;

        let line = self.lexer.current().line;
        let closing = self.lexer.expect_kind(TokenKind::Identifier)?;
        if closing != tag_name {
            return Err(StructuralError::TagMismatch {
                opened: tag_name,
                closed: closing,
                line,
            }
            .into());
        }
        self.lexer.expect(">")?;

        Ok(Some(id))
    }

    /// Consume body tokens up to and including the `</` of the end tag.
    fn parse_body(&mut self, id: ElementId, depth: usize) -> Result<()> {
        loop {
            let kind = self.lexer.current().kind;
            match kind {
                TokenKind::QuotedString => {
                    let text = self.lexer.advance()?;
                    self.doc.element_mut(id).add_contents(&unescape(&text.value));
                }
                TokenKind::Comment => {
                    let comment = self.lexer.advance()?;
                    self.pending_comment = Some(comment.value);
                }
                _ => {
                    if self.lexer.accept("<")? {
                        if self.lexer.accept("/")? {
                            return Ok(());
                        }
                        if let Some(child) = self.parse_element(depth + 1)? {
                            self.doc.add_child(id, child)?;
                        }
                    } else {
                        // Literal fallback. Advancing past EndOfFile fails here.
                        let text = self.lexer.advance()?;
                        self.doc.element_mut(id).add_contents(&text.value);
                    }
                }
            }
        }
    }

    /// Skip a `<?...>` header; the `<?` has already been consumed.
    fn skip_header(&mut self) -> Result<()> {
        while !self.lexer.accept(">")? {
            self.lexer.advance()?;
        }
        log::trace!(target: "tagtree.parser", "skipped header ending on line {}", self.lexer.line());
        Ok(())
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Parse a document held in memory.
pub fn parse_str(input: &str) -> Result<Document> {
    Parser::from_text(input)?.parse()
}

/// Parse a document from any buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Document> {
    Parser::new(reader)?.parse()
}

/// Parse a document file. The file is closed before this returns.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let doc = parse_reader(BufReader::new(File::open(path)?))?;
    log::debug!("parsed {} ({} elements)", path.display(), doc.len());
    Ok(doc)
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_str(s)
    }
}
