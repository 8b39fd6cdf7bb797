//! # Generator Configuration
//!
//! Settings that shape generated output, loaded from an optional
//! `balgen.toml` that sits alongside the model file:
//!
//! ```toml
//! listener_type = "http:Listener"
//! indent_width = 4
//! frame_output = true
//! ```
//!
//! Every key is optional. A missing file is not an error; a file that exists
//! but does not parse is.
//!
//! ## Environment Variables
//!
//! Applied on top of the file:
//!
//! - `BALGEN_LISTENER_TYPE` - listener type for generated listener declarations
//! - `BALGEN_INDENT_WIDTH` - spaces per indentation level
//!
//! `indent_width` may not exceed [`MAX_INDENT_WIDTH`]; a larger value from
//! any source is rejected when the configuration is resolved.

use crate::format::FormatOptions;
pub use crate::format::MAX_INDENT_WIDTH;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name auto-detected next to the model.
pub const CONFIG_FILE_NAME: &str = "balgen.toml";

/// Line printed before and after generated source.
pub const DEFAULT_SEPARATOR: &str = "============================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Type used in `listener <type> <name> = new (<port>);`
    pub listener_type: String,
    /// Spaces per indentation level in formatted output
    pub indent_width: usize,
    /// Print separator lines around the generated source
    pub frame_output: bool,
    /// Separator line text
    pub separator: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            listener_type: "http:Listener".to_string(),
            indent_width: 4,
            frame_output: true,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            indent_width: self.indent_width,
        }
    }

    /// Apply `BALGEN_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(ty) = env::var("BALGEN_LISTENER_TYPE") {
            if !ty.trim().is_empty() {
                self.listener_type = ty.trim().to_string();
            }
        }
        if let Ok(width) = env::var("BALGEN_INDENT_WIDTH") {
            match width.trim().parse() {
                Ok(width) => self.indent_width = width,
                Err(_) => warn!(value = %width, "ignoring non-numeric BALGEN_INDENT_WIDTH"),
            }
        }
        self
    }

    /// Reject settings the printer cannot honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.indent_width > MAX_INDENT_WIDTH {
            anyhow::bail!(
                "indent_width {} is too large (maximum {MAX_INDENT_WIDTH})",
                self.indent_width
            );
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path).with_context(|| {
        format!("Failed to read generator config: {}", config_path.display())
    })?;
    let config: GeneratorConfig = toml::from_str(&contents).with_context(|| {
        format!("Failed to parse generator config: {}", config_path.display())
    })?;
    config
        .validate()
        .with_context(|| format!("Invalid generator config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// `balgen.toml` in the model's directory.
pub fn detect_config_path(model_path: &Path) -> PathBuf {
    model_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE_NAME)
}

/// Resolve the effective configuration: an explicit path must exist, an
/// auto-detected one may be absent. Environment overrides apply last.
pub fn resolve_config(
    model_path: &Path,
    explicit: Option<&Path>,
) -> anyhow::Result<GeneratorConfig> {
    let config = match explicit {
        Some(path) => load_config(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => load_config(&detect_config_path(model_path))?.unwrap_or_default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
