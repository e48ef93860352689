//! tagtree Core
//!
//! A small XML-like text format for persisting configuration and layout
//! state: a line-oriented lexer, a recursive-descent parser, an arena-backed
//! element tree and an indenting serializer.
//!
//! # Architecture
//!
//! - **escape.rs** - Escape codec for `< > & " '`
//! - **token.rs** - Token kinds
//! - **lexer.rs** - Line-oriented lexer with one token of lookahead
//! - **parser.rs** - Recursive-descent parser producing a `Document`
//! - **tree.rs** - Arena element tree, read/write views, child-list edits
//! - **value.rs** - Typed attribute values
//! - **serializer.rs** - Indented writer and file output
//! - **registry.rs** - `class` attribute -> factory lookup
//! - **error.rs** - Lexical / structural error taxonomy
//!
//! # Example
//!
//! ```
//! use tagtree_core::{parse_str, serialize_to_string};
//!
//! let text = "<?xml version=\"1.0\"?>\n<!--main window-->\n<window width=\"800\">\"Title\"</window>\n";
//! let doc = parse_str(text).unwrap();
//! let window = doc.root_element();
//! assert_eq!(window.comment(), Some("main window"));
//! assert_eq!(window.get_int_throws("width").unwrap(), 800);
//! assert_eq!(window.contents(), Some("Title"));
//! assert_eq!(serialize_to_string(&doc), text);
//! ```

pub mod error;
pub mod escape;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod serializer;
pub mod token;
pub mod tree;
pub mod value;

pub use error::{Error, LexicalError, Result, StructuralError};
pub use escape::{escape, unescape};
pub use lexer::Lexer;
pub use parser::{parse_file, parse_reader, parse_str, Parser, MAX_DEPTH};
pub use registry::FactoryRegistry;
pub use serializer::{
    serialize_element, serialize_to_file, serialize_to_file_with, serialize_to_string, Serializer,
    WriteOptions, HEADER,
};
pub use token::{Token, TokenKind};
pub use tree::{Attribute, Document, ElementId, ElementMut, ElementRef};
pub use value::AttributeValue;
