mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use lifeadmin::telemetry::{self, LogFormat};

use args::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    if let Err(e) = telemetry::init_logging(cli.verbose, format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run { file } => commands::run(&config, &file),
        Command::Batch { directory, workers } => commands::batch(&config, &directory, workers),
        Command::Logs { run_id, limit } => commands::logs(&config, run_id.as_deref(), limit),
    }
}
