//! # CLI Module
//!
//! Command-line interface of the `balgen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate service source from a model and print it, framed by separator
//! lines, to stdout:
//!
//! ```bash
//! balgen generate --model service.yaml
//! ```
//!
//! Options:
//! - `--model <FILE>` - Path to the model (YAML or JSON, required)
//! - `--config <FILE>` - Generator configuration (default: `balgen.toml` next to the model)
//! - `--no-frame` - Omit the separator lines
//!
//! ### `lint`
//!
//! Check a model for duplicate or invalid names before generating:
//!
//! ```bash
//! balgen lint --model service.yaml --fail-on-error
//! ```
//!
//! ### `fmt`
//!
//! Print a source file in canonical form, or with `--check` fail when the
//! file differs from it:
//!
//! ```bash
//! balgen fmt --file service.bal --check
//! ```
//!
//! Logging goes to stderr and is controlled by `--verbose` and the
//! `BALGEN_LOG_*` variables (see [`crate::logging`]).

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
