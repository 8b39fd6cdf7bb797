use crate::config::{resolve_config, GeneratorConfig};
use crate::format::format_source;
use crate::generator::Generator;
use crate::linter::{fail_if_errors, lint_model, print_lint_issues, LintSeverity};
use crate::model::load_model;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Command-line interface for balgen
///
/// Generates service source from a model file, lints models and
/// formats existing source files.
#[derive(Parser, Debug)]
#[command(name = "balgen")]
#[command(about = "Service source generator", long_about = None)]
pub struct Cli {
    /// Log debug output to stderr (overrides BALGEN_LOG_LEVEL)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate service source from a model and print it to stdout
    Generate {
        /// Path to the model file (YAML or JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Path to the generator configuration file (balgen.toml)
        /// If not provided, will auto-detect alongside the model
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the source without separator lines
        #[arg(long, default_value_t = false)]
        no_frame: bool,
    },
    /// Lint a model for problems before generating
    Lint {
        /// Path to the model file (YAML or JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Path to the generator configuration file (balgen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Exit with error code if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Print a source file in canonical format
    Fmt {
        /// Source file to format
        #[arg(short, long)]
        file: PathBuf,

        /// Exit with error code if the file is not already formatted
        #[arg(long, default_value_t = false)]
        check: bool,

        /// Spaces per indentation level
        #[arg(long)]
        indent_width: Option<usize>,
    },
}

/// Parse the process arguments and execute the command
///
/// # Errors
///
/// Returns an error if:
/// - The model or source file cannot be read or parsed
/// - The configuration file is invalid
/// - Generation fails
/// - Linting finds errors and `--fail-on-error` is set
/// - `fmt --check` finds an unformatted file
pub fn run_cli() -> anyhow::Result<()> {
    execute(Cli::parse())
}

/// Execute an already parsed command line
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            model,
            config,
            no_frame,
        } => generate(&model, config.as_deref(), no_frame),
        Commands::Lint {
            model,
            config,
            fail_on_error,
            errors_only,
        } => lint(&model, config.as_deref(), fail_on_error, errors_only),
        Commands::Fmt {
            file,
            check,
            indent_width,
        } => fmt(&file, check, indent_width),
    }
}

fn generate(model_path: &Path, config: Option<&Path>, no_frame: bool) -> anyhow::Result<()> {
    let model = load_model(model_path)?;
    let mut config = resolve_config(model_path, config)?;
    if no_frame {
        config.frame_output = false;
    }

    let errors = lint_model(&model, &config)
        .into_iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .count();
    if errors > 0 {
        warn!(errors, "model has lint errors; run `balgen lint` for details");
    }

    Generator::new(config)
        .generate(&model)
        .with_context(|| format!("Failed to generate source for {}", model_path.display()))?;
    info!(model = %model_path.display(), "generation complete");
    Ok(())
}

fn lint(
    model_path: &Path,
    config: Option<&Path>,
    fail_on_error: bool,
    errors_only: bool,
) -> anyhow::Result<()> {
    let model = load_model(model_path)?;
    let config = resolve_config(model_path, config)?;
    let mut issues = lint_model(&model, &config);
    if errors_only {
        issues.retain(|i| i.severity == LintSeverity::Error);
    }
    print_lint_issues(&issues);
    if fail_on_error {
        fail_if_errors(&issues)?;
    }
    Ok(())
}

fn fmt(file: &Path, check: bool, indent_width: Option<usize>) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file: {}", file.display()))?;
    let mut config = GeneratorConfig::default().with_env_overrides();
    if let Some(width) = indent_width {
        config.indent_width = width;
    }
    config.validate()?;
    let formatted = format_source(&source, config.format_options())
        .with_context(|| format!("Failed to format {}", file.display()))?;

    if check {
        if formatted != source {
            anyhow::bail!("{} is not formatted", file.display());
        }
        info!(file = %file.display(), "already formatted");
        return Ok(());
    }
    print!("{formatted}");
    Ok(())
}
