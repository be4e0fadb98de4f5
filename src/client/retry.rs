//! Bounded retry for transient API failures
//!
//! The upstream gateway intermittently answers `502` for requests that the
//! backend may or may not have processed. Calls wrapped here are retried a
//! fixed number of times with a fixed delay; anything else propagates.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::config::RetrySettings;
use crate::error::{Error, Result};

/// Substring identifying a gateway failure in a rendered error
const TRANSIENT_MARKER: &str = "HTTP 502";

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay: settings.delay(),
        }
    }
}

/// Default transient-error predicate: the rendered error mentions `HTTP 502`.
pub fn is_transient(err: &Error) -> bool {
    err.to_string().contains(TRANSIENT_MARKER)
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up. `op` receives the 1-based attempt number.
pub async fn with_retry<T, F, Fut, P>(policy: &RetryPolicy, transient: P, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts && transient(&err) => {
                warn!(
                    "Transient failure on attempt {}/{}: {}; retrying in {:?}",
                    attempt, max_attempts, err, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
