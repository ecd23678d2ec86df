//! Retry logic with exponential backoff
//!
//! Status checks and page downloads go through [`with_retry`]. With the default
//! [`RetryConfig`] (`max_attempts == 0`) the first failure is returned as-is, so
//! retrying is strictly opt-in.
//!
//! ```no_run
//! use eloquactl::config::RetryConfig;
//! use eloquactl::retry::with_retry;
//! use eloquactl::types::SyncId;
//! use eloquactl::{BulkApi, HttpBulkClient};
//!
//! # async fn poll_once(client: &HttpBulkClient) -> eloquactl::Result<()> {
//! let retry = RetryConfig { max_attempts: 3, ..Default::default() };
//! let job = with_retry(&retry, || client.get_sync(SyncId(12345))).await?;
//! println!("sync is {}", job.status);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, throttling, server errors)
/// return `true`. Everything the user or the API contract has to fix returns `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            // Throttled or server-side failure
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            Error::InvalidFieldSpec { .. }
            | Error::MalformedSyncUri { .. }
            | Error::SyncCheckFailed { .. }
            | Error::SyncFailed { .. }
            | Error::SyncTimedOut { .. }
            | Error::DownloadFailed { .. }
            | Error::Validation { .. }
            | Error::Config { .. }
            | Error::NotFound(_)
            | Error::Interrupted { .. }
            | Error::Serialization(_) => false,
        }
    }
}

/// Delays between attempts: `initial_delay`, multiplied by `backoff_multiplier`
/// after every retry and capped at `max_delay`
struct Backoff<'a> {
    config: &'a RetryConfig,
    next: Duration,
}

impl<'a> Backoff<'a> {
    fn new(config: &'a RetryConfig) -> Self {
        Self {
            config,
            next: config.initial_delay,
        }
    }

    fn step(&mut self) -> Duration {
        let current = self.next;
        self.next = current
            .mul_f64(self.config.backoff_multiplier)
            .min(self.config.max_delay);
        if self.config.jitter {
            add_jitter(current)
        } else {
            current
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or `config.max_attempts`
/// retries are spent; the last error is returned unchanged.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut backoff = Backoff::new(config);
    let mut retries: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(retries, "recovered after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(error);
        }
        if retries >= config.max_attempts {
            if config.max_attempts > 0 {
                tracing::error!(error = %error, retries, "retry budget spent");
            }
            return Err(error);
        }

        retries += 1;
        let wait = backoff.step();
        tracing::warn!(
            error = %error,
            retry = retries,
            of = config.max_attempts,
            wait_ms = wait.as_millis(),
            "transient failure"
        );
        tokio::time::sleep(wait).await;
    }
}

/// Stretch `delay` by a random factor in `[1, 2]`
fn add_jitter(delay: Duration) -> Duration {
    delay.mul_f64(1.0 + rand::thread_rng().gen_range(0.0..=1.0))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn default_config_never_retries() {
        let config = RetryConfig::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should retry twice before success"
        );
    }

    #[tokio::test]
    async fn gives_up_after_budget_is_spent() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(2), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should try initial + 2 retries"
        );
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backoff_waits_between_attempts() {
        let start = std::time::Instant::now();

        let _ = with_retry(&fast_config(3), || async {
            Err::<i32, _>(TestError::Transient)
        })
        .await;

        // 10ms + 20ms + 40ms
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(70),
            "should wait at least 70ms, waited {:?}",
            elapsed
        );
        assert!(elapsed < Duration::from_secs(2), "waited {:?}", elapsed);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            backoff_multiplier: 2.0,
            jitter: false,
        };
        let mut backoff = Backoff::new(&config);
        let waits: Vec<u128> = (0..4).map(|_| backoff.step().as_millis()).collect();
        assert_eq!(waits, vec![100, 200, 350, 350]);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_millis(100);
        for _ in 0..500 {
            let d = add_jitter(base);
            assert!(d >= base && d <= base * 2, "{:?} out of range", d);
        }
    }

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        for status in [429, 500, 502, 503] {
            let err = Error::Api {
                status,
                body: String::new(),
            };
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404] {
            let err = Error::Api {
                status,
                body: String::new(),
            };
            assert!(!err.is_retryable(), "{status} should not be retryable");
        }
    }

    #[test]
    fn io_timeouts_are_retryable() {
        let timeout = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "t"));
        assert!(timeout.is_retryable());

        let denied = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!denied.is_retryable());
    }

    #[test]
    fn protocol_errors_are_permanent() {
        assert!(
            !Error::MalformedSyncUri {
                uri: "/syncs/x".to_string()
            }
            .is_retryable()
        );
        assert!(!Error::SyncFailed { id: 1 }.is_retryable());
        assert!(
            !Error::InvalidFieldSpec {
                entry: "x".to_string()
            }
            .is_retryable()
        );
    }
}
