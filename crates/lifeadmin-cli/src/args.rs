use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// lifeadmin - turn bills, invoices and receipts into follow-up actions
#[derive(Parser, Debug)]
#[command(name = "lifeadmin")]
#[command(version)]
#[command(long_about = r#"
Runs uploaded documents through OCR, classification and routing, then creates
a Todoist task, sends a reminder email or pushes a notification. Every stage is
recorded in the configured log store.

EXAMPLES:
  lifeadmin run ~/Downloads/invoice.png
  lifeadmin batch ~/Scans --workers 4
  lifeadmin logs
  lifeadmin logs 0b7c1f8e-2f55-4d3a-9c1e-6a8c1b1f0e2a

CONFIGURATION:
  Defaults to ~/.lifeadmin/config.json (JSON or YAML). Without a file, API keys
  are read from OCR_SPACE_API_KEY, GROQ_API_KEY, TODOIST_API_KEY,
  SENDGRID_API_KEY, ONESIGNAL_APP_ID and ONESIGNAL_API_KEY.
"#)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a single upload and print the final pipeline state as JSON
    Run {
        /// Image or PDF to process
        file: PathBuf,
    },

    /// Process every supported file at the top level of a directory
    Batch {
        directory: PathBuf,

        /// Number of worker threads (defaults to the configured worker count)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Show stored stage log entries
    Logs {
        /// Run to show; lists recent runs when omitted
        run_id: Option<String>,

        /// Number of recent runs to list
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}
