//! Polling with a deadline.
//!
//! Every DOM wait in this crate is a probe run on an interval until it
//! yields a value or the deadline passes. Probe errors count as "not yet":
//! a page in the middle of a reload rejects script evaluation for a moment.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Poll `probe` until it returns `Ok(Some(_))`.
///
/// The probe always runs at least once, even with a zero timeout.
pub async fn wait_for_value<T, F, Fut>(probe: F, config: WaitConfig, description: &str) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + config.timeout;

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => tracing::trace!(condition = description, error = %err, "probe failed, retrying"),
        }

        if Instant::now() >= deadline {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Poll a fallible predicate until it holds.
pub async fn wait_for_result<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    wait_for_value(
        || {
            let check = condition();
            async move { check.await.map(|holds| holds.then_some(())) }
        },
        config,
        description,
    )
    .await
}

/// Poll an infallible predicate until it holds.
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_for_value(
        || {
            let check = condition();
            async move { Ok(check.await.then_some(())) }
        },
        config,
        description,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_value_is_returned_once_available() {
        let calls = Arc::new(AtomicU32::new(0));
        let probe_calls = calls.clone();

        let value = wait_for_value(
            move || {
                let calls = probe_calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Ok((n >= 2).then(|| format!("ready after {}", n)))
                }
            },
            WaitConfig::with_timeout(Duration::from_secs(5)),
            "third poll",
        )
        .await
        .unwrap();

        assert_eq!(value, "ready after 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_errors_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let probe_calls = calls.clone();

        let result = wait_for_result(
            move || {
                let calls = probe_calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(BrowserError::ScriptExecutionFailed("page is reloading".into()))
                    } else {
                        Ok(true)
                    }
                }
            },
            WaitConfig::default(),
            "settles after a reload",
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_description() {
        let err = wait_for(
            || async { false },
            WaitConfig::new(Duration::from_millis(100), Duration::from_millis(10)),
            "never",
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "wait condition 'never' timed out after 100ms"
        );
    }

    #[tokio::test]
    async fn test_zero_timeout_still_probes_once() {
        let result = wait_for(|| async { true }, WaitConfig::with_timeout(Duration::ZERO), "now").await;
        assert!(result.is_ok());
    }
}
