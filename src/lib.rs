//! # eloquactl
//!
//! Command-line client for the Eloqua Bulk API.
//!
//! Every export follows the same protocol: an export definition is created, a sync
//! is started for it and polled until it finishes, then the synced rows are
//! downloaded page by page into a result sink (table, JSON or newline-delimited
//! JSON).
//!
//! The library exposes each step so the pipeline can be driven against any
//! [`client::BulkApi`] implementation:
//!
//! ```no_run
//! use eloquactl::client::HttpBulkClient;
//! use eloquactl::definition::{ExportSettings, resolve_fields};
//! use eloquactl::output::{OutputFormat, create_sink, open_output};
//! use eloquactl::types::ExportResource;
//! use eloquactl::{Config, run_export};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.bulk_url = "https://secure.p01.eloqua.com/api/bulk/{version}".to_string();
//!     config.api.company = "Acme".to_string();
//!     config.api.username = "jane.doe".to_string();
//!     config.api.password = "secret".to_string();
//!     config.validate()?;
//!
//!     let client = HttpBulkClient::new(&config.api)?;
//!     let resource = ExportResource::Contacts;
//!     let selection = resolve_fields(&client, &resource, "Email:{{Contact.Field(C_EmailAddress)}}").await?;
//!     let definition = ExportSettings::default().build(&resource, selection.fields, String::new())?;
//!
//!     let mut sink = create_sink(OutputFormat::Ndj, selection.keys, true, open_output(None)?);
//!     let summary = run_export(&client, &config, &resource, &definition, sink.as_mut()).await?;
//!     eprintln!("{} rows", summary.download.rows);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command-line surface
pub mod cli;
/// Remote Bulk API access
pub mod client;
/// Configuration types
pub mod config;
/// Export definition builder
pub mod definition;
/// Paginated download of synced rows
pub mod download;
/// Error types
pub mod error;
/// End-to-end export pipeline
pub mod export;
/// Export filter assembly
pub mod filter;
/// Tracing subscriber setup
pub mod logging;
/// Result sinks
pub mod output;
/// Retry logic with exponential backoff
pub mod retry;
/// Sync creation and polling
pub mod sync;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::{BulkApi, HttpBulkClient};
pub use config::{ApiConfig, Config, RetryConfig, SyncConfig};
pub use error::{Error, Result};
pub use export::{ExportSummary, run_export};
pub use output::{OutputFormat, RowSink};
pub use types::{ExportDefinition, ExportResource, FieldMap, ResultPage, Row, SyncId, SyncJob, SyncStatus};

use std::future::Future;

/// Run `task` until it completes or a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// On a signal the task is dropped, which abandons any in-flight request, and
/// [`Error::Interrupted`] is returned. Rows already written stay written.
pub async fn run_until_signal<F>(task: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        result = task => result,
        signal = wait_for_signal() => {
            tracing::warn!(signal, "stopping on signal");
            Err(Error::Interrupted { signal })
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            tokio::signal::ctrl_c().await.ok();
            "SIGINT"
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                std::future::pending::<()>().await;
            }
            "SIGTERM"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
