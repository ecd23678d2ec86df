//! Error types for eloquactl
//!
//! Every error is fatal for the current invocation: nothing is recovered locally,
//! errors propagate to the command boundary where they are printed and the process
//! exits with a non-zero code. The [`retry`](crate::retry) module decides which of
//! them may be retried before that happens.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for eloquactl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for eloquactl
#[derive(Debug, Error)]
pub enum Error {
    /// A `--fields` entry does not have exactly one `alias:expression` separator
    #[error("invalid field specification {entry:?}: expected exactly one ':' between alias and expression")]
    InvalidFieldSpec {
        /// The offending comma-separated entry, untrimmed
        entry: String,
    },

    /// The sync URI returned by the server does not end in a numeric id
    #[error("malformed sync URI {uri:?}: expected '/syncs/<id>'")]
    MalformedSyncUri {
        /// The URI exactly as returned by the server
        uri: String,
    },

    /// Re-fetching the sync status failed while polling
    #[error("failed to check status of sync {id}")]
    SyncCheckFailed {
        /// The sync being polled
        id: u64,
        /// The underlying request failure
        #[source]
        source: Box<Error>,
    },

    /// The server reported that the sync itself failed
    #[error("sync {id} finished with status 'error'")]
    SyncFailed {
        /// The failed sync
        id: u64,
    },

    /// The sync did not reach a terminal state before the configured deadline
    #[error("sync {id} did not finish within {waited:?}")]
    SyncTimedOut {
        /// The sync being polled
        id: u64,
        /// How long the client waited before giving up
        waited: Duration,
    },

    /// Fetching a page of synced data failed
    #[error("failed to download page at offset {offset} of sync {id}")]
    DownloadFailed {
        /// The sync whose data was being downloaded
        id: u64,
        /// Offset of the page that could not be fetched
        offset: u64,
        /// The underlying request failure
        #[source]
        source: Box<Error>,
    },

    /// User input failed validation (dates, durations, names, activity types)
    #[error("invalid {field}: {message}")]
    Validation {
        /// The flag or attribute that failed validation (e.g., "since")
        field: String,
        /// Human-readable description of the problem
        message: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bulk_url")
        key: Option<String>,
    },

    /// A named remote resource (custom object, scoring model) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status code
    #[error("API returned {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was stopped by a termination signal
    #[error("interrupted by {signal}")]
    Interrupted {
        /// Signal name, e.g. "SIGINT"
        signal: &'static str,
    },

    /// I/O error (writing output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Config`] error tied to a key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Process exit code for this error.
    ///
    /// All errors are terminal and map to `1`; `2` stays reserved for clap usage errors.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Render the error followed by its `source` chain, one cause per line.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
