//! Sync orchestration: create a sync for a submitted export and poll it to a
//! terminal state.
//!
//! Polling is strictly sequential. Between status checks the task sleeps for the
//! fixed [`SyncConfig::poll_interval`]; the whole wait is bounded by
//! [`SyncConfig::timeout`] unless the operator disabled it.

use crate::client::BulkApi;
use crate::config::{RetryConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::types::{SyncId, SyncJob, SyncStatus};
use tokio::time::Instant;

/// Every sync URI starts with this prefix; the id is the remainder
pub const SYNC_URI_PREFIX: &str = "/syncs/";

/// Extract the numeric id from a sync URI such as `/syncs/12345`.
///
/// The id is whatever follows the fixed-length prefix; it must be a non-empty run
/// of ASCII digits.
pub fn parse_sync_id(uri: &str) -> Result<SyncId> {
    uri.get(SYNC_URI_PREFIX.len()..)
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .map(SyncId)
        .ok_or_else(|| Error::MalformedSyncUri {
            uri: uri.to_string(),
        })
}

/// Request a sync of the export at `export_uri`
pub async fn start_sync(api: &dyn BulkApi, export_uri: &str) -> Result<SyncJob> {
    let job = api.create_sync(export_uri).await?;
    tracing::info!(sync_uri = %job.uri, export_uri, status = %job.status, "sync created");
    Ok(job)
}

/// Poll `job` until it succeeds, fails, or the deadline passes.
///
/// Returns the sync id once the status is `success`. A status of `error` yields
/// [`Error::SyncFailed`]; a failed status check yields [`Error::SyncCheckFailed`]
/// after the retry budget is spent.
pub async fn wait_for_sync(
    api: &dyn BulkApi,
    job: SyncJob,
    sync: &SyncConfig,
    retry: &RetryConfig,
) -> Result<SyncId> {
    let id = parse_sync_id(&job.uri)?;
    let started = Instant::now();
    let mut status = job.status;
    let mut checks: u32 = 0;

    if sync.timeout.is_none() {
        tracing::warn!(sync_id = %id, "sync timeout disabled; waiting until the server finishes");
    }

    while !status.is_terminal() {
        tokio::time::sleep(sync.poll_interval).await;

        let current = with_retry(retry, || api.get_sync(id))
            .await
            .map_err(|e| Error::SyncCheckFailed {
                id: id.get(),
                source: Box::new(e),
            })?;
        status = current.status;
        checks += 1;

        tracing::debug!(sync_id = %id, status = %status, checks, "sync status");

        if let Some(timeout) = sync.timeout {
            let waited = started.elapsed();
            if !status.is_terminal() && waited >= timeout {
                return Err(Error::SyncTimedOut {
                    id: id.get(),
                    waited,
                });
            }
        }
    }

    match status {
        SyncStatus::Success => {
            tracing::info!(
                sync_id = %id,
                checks,
                elapsed_ms = started.elapsed().as_millis(),
                "sync finished"
            );
            Ok(id)
        }
        _ => {
            tracing::error!(sync_id = %id, "sync reported error");
            Err(Error::SyncFailed { id: id.get() })
        }
    }
}
