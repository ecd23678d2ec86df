//! Configuration types for eloquactl
//!
//! The binary assembles a [`Config`] from command-line flags and environment
//! variables; nothing is read from disk.

use crate::error::{Error, Result};
use std::time::Duration;

/// Largest page the Bulk API accepts for `GET /syncs/{id}/data`
pub const MAX_PAGE_SIZE: u32 = 25_000;

/// Bulk API version used when none is given
pub const DEFAULT_API_VERSION: &str = "2.0";

/// Main configuration, threaded explicitly into every component
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Bulk API endpoint and credentials
    pub api: ApiConfig,

    /// Sync polling and download behavior
    pub sync: SyncConfig,

    /// Retry policy for status checks and page downloads
    pub retry: RetryConfig,
}

impl Config {
    /// Check the configuration before any request is made
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.sync.validate()
    }
}

/// Bulk API endpoint and credentials
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL of the Bulk API, optionally with a `{version}` placeholder
    /// (e.g. `https://secure.p01.eloqua.com/api/bulk/{version}`)
    pub bulk_url: String,

    /// Company (site) name, the first half of the basic-auth user
    pub company: String,

    /// User name
    pub username: String,

    /// Password
    pub password: String,

    /// Bulk API version substituted for `{version}` (default: "2.0")
    pub api_version: String,

    /// Timeout applied to every individual HTTP request (default: 60 seconds)
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bulk_url: String::new(),
            company: String::new(),
            username: String::new(),
            password: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ApiConfig {
    /// Base URL with the `{version}` placeholder resolved and no trailing slash
    pub fn base_url(&self) -> String {
        self.bulk_url
            .replacen("{version}", &self.api_version, 1)
            .trim_end_matches('/')
            .to_string()
    }

    /// Basic-auth user name in the `company\username` form the API expects
    pub fn auth_user(&self) -> String {
        format!("{}\\{}", self.company, self.username)
    }

    fn validate(&self) -> Result<()> {
        if self.bulk_url.trim().is_empty() {
            return Err(Error::config("bulk_url", "bulk API URL is required"));
        }
        url::Url::parse(&self.base_url())
            .map_err(|e| Error::config("bulk_url", format!("invalid URL: {e}")))?;
        if self.company.is_empty() || self.username.is_empty() {
            return Err(Error::config(
                "username",
                "company and username are both required",
            ));
        }
        if self.password.is_empty() {
            return Err(Error::config("password", "password is required"));
        }
        Ok(())
    }
}

/// Sync polling and download configuration
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Fixed sleep between sync status checks (default: 2 seconds)
    pub poll_interval: Duration,

    /// Deadline for a sync to reach a terminal state (default: 1 hour, None = wait forever)
    pub timeout: Option<Duration>,

    /// Rows requested per data page (default and maximum: 25000)
    pub page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(3600)),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl SyncConfig {
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(
                "page_size",
                format!("page size must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll_interval", "poll interval must be positive"));
        }
        Ok(())
    }
}

/// Retry configuration for transient failures
///
/// The default performs no retries: a failed status check or page fetch is
/// immediately fatal.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}
