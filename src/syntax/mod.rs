//! # Syntax Module
//!
//! Grammar for the generated service language: a pest grammar
//! (`grammar.pest`), a span-free syntax tree and one parser entry point per
//! construct the generator synthesizes. Fragments nested deeper than
//! [`MAX_NESTING`] brackets are rejected with a `nesting too deep` error
//! before the grammar runs.
//!
//! ```rust
//! use balgen::syntax::{parse_import_declaration, parse_function_body_block};
//!
//! let import = parse_import_declaration("import ballerina/http;").unwrap();
//! assert_eq!(import.module[0].as_str(), "http");
//!
//! let body = parse_function_body_block(r#"{ return "x"; }"#).unwrap();
//! assert_eq!(body.statements.len(), 1);
//! ```

mod ast;
mod error;
mod parser;
#[cfg(test)]
mod tests;

pub use ast::*;
pub use error::{Position, SyntaxError};
pub use parser::{
    is_identifier, is_keyword, is_literal, parse_compilation_unit, parse_function_body_block,
    parse_import_declaration, parse_module_member, parse_object_member, MAX_DEPTH, MAX_NESTING,
};

/// A source document together with its compilation unit.
///
/// Generation starts from [`SyntaxTree::empty`] and swaps in the assembled
/// root with [`SyntaxTree::modify_with`]; `balgen fmt` starts from
/// [`SyntaxTree::from_source`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxTree {
    root: CompilationUnit,
}

impl SyntaxTree {
    /// Tree of an empty document.
    pub fn empty() -> Self {
        SyntaxTree::default()
    }

    pub fn from_source(source: &str) -> Result<Self, SyntaxError> {
        Ok(SyntaxTree {
            root: parse_compilation_unit(source)?,
        })
    }

    /// Replace the root node, returning the new tree.
    pub fn modify_with(self, root: CompilationUnit) -> Self {
        SyntaxTree { root }
    }

    pub fn root(&self) -> &CompilationUnit {
        &self.root
    }

    pub fn into_root(self) -> CompilationUnit {
        self.root
    }
}
