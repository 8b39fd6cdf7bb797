//! # Format Module
//!
//! Canonical pretty-printer for syntax trees.
//!
//! The printer owns all layout decisions: indentation, blank lines between
//! declarations, spacing around operators. Source layout is never consulted,
//! so formatting is idempotent: printing a tree, re-parsing the text and
//! printing again yields the same text.
//!
//! ## Layout
//!
//! ```text
//! import ballerina/http;
//!
//! listener http:Listener l1 = new (9090);
//!
//! service /greeting on l1 {
//!     resource function get sayHello() returns string {
//!         return "Hello";
//!     }
//! }
//! ```
//!
//! Identifiers and raw literals are re-checked against the grammar while
//! printing. A tree assembled by hand with, say, a listener named `my port`
//! has no valid spelling and is rejected with a [`FormatError`] instead of
//! producing text that would not parse.

mod printer;

use crate::syntax::{SyntaxError, SyntaxTree};
use thiserror::Error;

pub use printer::Printer;

/// Widest indentation step the printer emits.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Layout options for the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per indentation level, capped at [`MAX_INDENT_WIDTH`]
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions { indent_width: 4 }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("cannot print {context}: `{text}` is not a valid identifier")]
    InvalidIdentifier { context: &'static str, text: String },
    #[error("cannot print {context}: `{text}` is not a valid literal")]
    InvalidLiteral { context: &'static str, text: String },
    #[error("cannot print {context}: {reason}")]
    Unprintable {
        context: &'static str,
        reason: String,
    },
    #[error("source does not parse: {0}")]
    Parse(#[from] SyntaxError),
}

/// Format a whole tree into canonical source text.
pub fn format_tree(tree: &SyntaxTree, options: FormatOptions) -> Result<String, FormatError> {
    Printer::new(options).print_unit(tree.root())
}

/// Parse `source` and print it canonically.
pub fn format_source(source: &str, options: FormatOptions) -> Result<String, FormatError> {
    let tree = SyntaxTree::from_source(source)?;
    format_tree(&tree, options)
}
