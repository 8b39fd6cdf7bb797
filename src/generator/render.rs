use std::io::Write;

use tracing::debug;

use super::error::GenerateError;
use crate::config::GeneratorConfig;
use crate::format::format_tree;
use crate::syntax::{CompilationUnit, SyntaxTree};

/// Formats an assembled unit and writes it out, framed by separator lines.
pub struct Renderer<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Renderer { config }
    }

    /// Install `unit` as the root of an empty tree and format it.
    pub fn render(&self, unit: &CompilationUnit) -> Result<String, GenerateError> {
        let tree = SyntaxTree::empty().modify_with(unit.clone());
        let text = format_tree(&tree, self.config.format_options())?;
        debug!(bytes = text.len(), "formatted generated source");
        Ok(text)
    }

    /// Write `text`, wrapped in separator lines when framing is enabled.
    ///
    /// The formatted text already ends with a newline, so the closing
    /// separator follows it directly.
    pub fn emit<W: Write>(&self, text: &str, out: &mut W) -> Result<(), GenerateError> {
        if self.config.frame_output {
            writeln!(out, "{}", self.config.separator)?;
        }
        out.write_all(text.as_bytes())?;
        if self.config.frame_output {
            writeln!(out, "{}", self.config.separator)?;
        }
        out.flush()?;
        Ok(())
    }
}
