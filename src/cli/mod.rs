//! Command-line surface
//!
//! `eloquactl export <resource>` runs the export pipeline; `eloquactl get <what>`
//! lists field definitions. Connection settings are global flags with
//! environment fallbacks.

mod export;
mod get;

pub use export::{
    ActivityExportArgs, CdoExportArgs, EntityExportArgs, ExportArgs, ExportCommand,
    ScoresExportArgs,
};
pub use get::GetCommand;

use crate::client::{BulkApi, HttpBulkClient};
use crate::config::{ApiConfig, Config, DEFAULT_API_VERSION, RetryConfig, SyncConfig};
use crate::error::Result;
use crate::logging::{LogFormat, LogLevel};
use crate::output::{OutputFormat, RowSink, create_sink, open_output};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Eloqua Bulk API client
#[derive(Parser, Debug)]
#[command(name = "eloquactl")]
#[command(about = "Export data from Eloqua through the Bulk API")]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Endpoint and credentials
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Logging level (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Log record format
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: LogFormat,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a resource through a bulk export definition
    Export {
        /// Resource to export
        #[command(subcommand)]
        resource: ExportCommand,
    },
    /// List resource metadata
    Get {
        /// Metadata to list
        #[command(subcommand)]
        resource: GetCommand,
    },
}

/// Endpoint, credentials and request policy
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Bulk API base URL; `{version}` is replaced by --api-version
    #[arg(long, global = true, env = "ELOQUA_BULK_URL")]
    pub bulk_url: Option<String>,

    /// Company (site) name
    #[arg(long, global = true, env = "ELOQUA_COMPANY")]
    pub company: Option<String>,

    /// User name
    #[arg(long, global = true, env = "ELOQUA_USERNAME")]
    pub username: Option<String>,

    /// Password
    #[arg(long, global = true, env = "ELOQUA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bulk API version
    #[arg(long, global = true, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub request_timeout: u64,

    /// Give up waiting for a sync after this many seconds (0 waits forever)
    #[arg(long, global = true, default_value_t = 3600)]
    pub sync_timeout: u64,

    /// Retries for transient failures while polling and downloading
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,
}

impl ConnectionArgs {
    /// Assemble the runtime configuration; [`Config::validate`] checks it
    pub fn to_config(&self) -> Config {
        Config {
            api: ApiConfig {
                bulk_url: self.bulk_url.clone().unwrap_or_default(),
                company: self.company.clone().unwrap_or_default(),
                username: self.username.clone().unwrap_or_default(),
                password: self.password.clone().unwrap_or_default(),
                api_version: self.api_version.clone(),
                request_timeout: Duration::from_secs(self.request_timeout),
            },
            sync: SyncConfig {
                timeout: (self.sync_timeout > 0).then(|| Duration::from_secs(self.sync_timeout)),
                ..Default::default()
            },
            retry: RetryConfig {
                max_attempts: self.retries,
                ..Default::default()
            },
        }
    }
}

/// Output selection shared by every command that prints rows
#[derive(Args, Debug, Clone)]
pub struct PrintArgs {
    /// Output format
    #[arg(short = 'o', long, default_value = "table", value_enum)]
    pub output: OutputFormat,

    /// Omit the header line of table output
    #[arg(long)]
    pub no_headers: bool,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PrintArgs {
    /// Open the destination and build the sink for `columns`
    pub fn sink(&self, columns: Vec<String>) -> Result<Box<dyn RowSink>> {
        let writer = open_output(self.file.as_deref())?;
        Ok(create_sink(self.output, columns, !self.no_headers, writer))
    }
}

/// Validate the configuration, connect, and run the selected command
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.connection.to_config();
    config.validate()?;
    let client = HttpBulkClient::new(&config.api)?;
    execute(&client, &config, cli.command).await
}

/// Run `command` against `api`
pub async fn execute(api: &dyn BulkApi, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Export { resource } => export::execute(api, config, resource).await,
        Commands::Get { resource } => get::execute(api, resource).await,
    }
}
