//! Polling waits with a deadline
//!
//! Element appearance and page readiness are the only conditions that get
//! polled. Submission and assertions are never retried.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::driver::{DriverError, DriverResult};

/// Default poll interval for checking conditions
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy)]
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
        Self::new(timeout, DEFAULT_POLL_INTERVAL.min(timeout))
    }
}

/// Poll `condition` until it yields `Ok(true)` or the timeout expires.
///
/// Errors from the condition count as "not yet"; the last one is dropped in
/// favour of a [`DriverError::Timeout`] naming `description`. A closed
/// browser never recovers and is returned at once.
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> DriverResult<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    let start = Instant::now();

    loop {
        match condition().await {
            Ok(true) => return Ok(()),
            Err(DriverError::Closed) => return Err(DriverError::Closed),
            _ => {}
        }

        if start.elapsed() >= config.timeout {
            return Err(DriverError::Timeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Poll `probe` for the whole window, failing as soon as it yields `true`.
///
/// Used to prove something did *not* happen: returns `Ok(false)` when the
/// window elapsed quietly and `Ok(true)` the moment the probe fired.
pub async fn watch_for<F, Fut>(probe: F, config: WaitConfig) -> DriverResult<bool>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    let start = Instant::now();

    loop {
        if probe().await? {
            return Ok(true);
        }

        if start.elapsed() >= config.timeout {
            return Ok(false);
        }

        sleep(config.poll_interval).await;
    }
}
