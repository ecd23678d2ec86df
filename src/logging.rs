//! Tracing subscriber setup for the binary
//!
//! Logs always go to stderr; stdout carries exported data only.

use crate::error::{Error, Result};
use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Single-line human-readable records
    #[default]
    Compact,
    /// Multi-line human-readable records
    Pretty,
    /// One JSON object per record
    Json,
}

/// Log level selected with `--log-level`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Per-poll and per-page detail
    Debug,
    /// Export progress
    Info,
    /// Retries and disabled deadlines (default)
    #[default]
    Warn,
    /// Errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Filter directive for `level`, scoped to this crate
fn directive(level: LogLevel) -> String {
    let level = Level::from(level).as_str().to_lowercase();
    format!("eloquactl={level}")
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over `level`.
pub fn init_tracing(level: LogLevel, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(level)))
        .map_err(|e| Error::config("log_level", format!("invalid tracing filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
    };
    installed.map_err(|e| Error::config("log_format", format!("tracing already initialised: {e}")))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?format,
        "tracing initialised"
    );
    Ok(())
}
