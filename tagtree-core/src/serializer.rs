//! Serializer.
//!
//! Output layout, with the default two-space indent:
//!
//! ```text
//! <?xml version="1.0"?>
//! <!--optional comment-->
//! <layout version="2">
//!   "contents of an element with children"
//!   <pane name="left">"inline contents"</pane>
//!   <pane name="right"></pane>
//! </layout>
//! ```
//!
//! Elements without children are written on one line; elements with
//! children put their contents, each child and the closing tag on lines of
//! their own. All text is escaped, so the output parses back to the same
//! tree.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::error::Result;
use crate::escape::escape;
use crate::tree::{Document, ElementRef};

/// The header line written at the top of every document.
pub const HEADER: &str = r#"<?xml version="1.0"?>"#;

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Write [`HEADER`] before the root element.
    pub header: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: 2,
            header: true,
        }
    }
}

/// One pending unit of work in [`Serializer::write_element`].
enum Step<'a> {
    Open(ElementRef<'a>, usize),
    Close(ElementRef<'a>, usize),
}

/// Writes elements as text into any [`fmt::Write`] sink.
pub struct Serializer<W> {
    out: W,
    options: WriteOptions,
}

impl<W: fmt::Write> Serializer<W> {
    pub fn new(out: W) -> Self {
        Serializer::with_options(out, WriteOptions::default())
    }

    pub fn with_options(out: W, options: WriteOptions) -> Self {
        Serializer { out, options }
    }

    /// Write the header (if enabled) followed by the root element.
    pub fn write_document(&mut self, doc: &Document) -> fmt::Result {
        if self.options.header {
            writeln!(self.out, "{HEADER}")?;
        }
        self.write_element(doc.root_element(), 0)
    }

    /// Write one element and its subtree at nesting level `depth`.
    ///
    /// Walks the subtree with an explicit stack, so depth is not limited by
    /// the call stack.
    pub fn write_element(&mut self, element: ElementRef<'_>, depth: usize) -> fmt::Result {
        let mut pending = vec![Step::Open(element, depth)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(element, depth) => {
                    self.write_start(element, depth)?;
                    if element.child_count() == 0 {
                        writeln!(self.out, "</{}>", element.tag_name())?;
                    } else {
                        pending.push(Step::Close(element, depth));
                        let first = pending.len();
                        pending.extend(element.children().map(|child| Step::Open(child, depth + 1)));
                        pending[first..].reverse();
                    }
                }
                Step::Close(element, depth) => {
                    self.write_indent(depth)?;
                    writeln!(self.out, "</{}>", element.tag_name())?;
                }
            }
        }
        Ok(())
    }

    /// Comment, start tag and contents. Contents go inline for a leaf and on
    /// their own line otherwise.
    fn write_start(&mut self, element: ElementRef<'_>, depth: usize) -> fmt::Result {
        if let Some(comment) = element.comment() {
            self.write_indent(depth)?;
            writeln!(self.out, "<!--{}-->", escape(comment))?;
        }

        self.write_indent(depth)?;
        write!(self.out, "<{}", element.tag_name())?;
        for (name, value) in element.attributes() {
            write!(self.out, " {}=\"{}\"", name, escape(value))?;
        }
        self.out.write_char('>')?;

        match element.contents() {
            Some(contents) if element.child_count() == 0 => {
                write!(self.out, "\"{}\"", escape(contents))
            }
            Some(contents) => {
                self.out.write_char('\n')?;
                self.write_indent(depth + 1)?;
                writeln!(self.out, "\"{}\"", escape(contents))
            }
            None if element.child_count() == 0 => Ok(()),
            None => self.out.write_char('\n'),
        }
    }

    fn write_indent(&mut self, depth: usize) -> fmt::Result {
        for _ in 0..depth * self.options.indent {
            self.out.write_char(' ')?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Renders a document with default options.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Serializer::new(f).write_document(self)
    }
}

/// A document paired with write options, rendered through `Display`.
pub struct Rendered<'a> {
    doc: &'a Document,
    options: &'a WriteOptions,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Serializer::with_options(f, self.options.clone()).write_document(self.doc)
    }
}

impl Document {
    /// Render with custom options, e.g. `doc.rendered(&opts).to_string()`.
    pub fn rendered<'a>(&'a self, options: &'a WriteOptions) -> Rendered<'a> {
        Rendered { doc: self, options }
    }
}

/// A subtree rendered without the header.
struct Subtree<'a>(ElementRef<'a>);

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Serializer::new(f).write_element(self.0, 0)
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// The full document text, header included.
pub fn serialize_to_string(doc: &Document) -> String {
    doc.to_string()
}

/// One element and its subtree, without the header.
pub fn serialize_element(element: ElementRef<'_>) -> String {
    Subtree(element).to_string()
}

/// Write the document to `path`, replacing any existing file.
pub fn serialize_to_file(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    serialize_to_file_with(doc, path, &WriteOptions::default())
}

/// [`serialize_to_file`] with custom options.
///
/// The text is rendered in full before the file is created, and the file
/// is flushed and closed before this returns.
pub fn serialize_to_file_with(doc: &Document, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let text = doc.rendered(options).to_string();

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    log::debug!("wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}
