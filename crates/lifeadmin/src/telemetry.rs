//! Process-wide logging setup for binaries embedding the library.

use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "lifeadmin=info,warn";
pub const VERBOSE_FILTER: &str = "lifeadmin=debug,info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// `RUST_LOG` wins over the built-in defaults.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber and routes `log` records (database and
/// worker layers) into it. Fails if a subscriber is already installed.
pub fn init_logging(
    verbose: bool,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    LogTracer::init()?;

    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    match format {
        LogFormat::Compact => {
            let layer = fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .compact();
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
    }
    Ok(())
}
