use balgen::cli::Cli;
use balgen::logging::{init_logging, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::from_env()
    };
    // Held until exit so buffered log lines are flushed.
    let _guard = init_logging(&log_config)?;
    balgen::cli::execute(cli)
}
