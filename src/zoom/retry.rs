//! Bounded retry for transient Zoom API failures.

use crate::errors::AppResult;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before retry `n` is `n * backoff`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            max_retries,
            backoff: Duration::from_millis(backoff_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0)
    }
}

/// Run `op`, retrying while it fails with a transient error and the
/// policy allows another attempt. Permanent errors return immediately.
pub fn with_retry<T, F>(policy: &RetryPolicy, what: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> AppResult<T>,
{
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                log::warn!(
                    "{} failed ({}), retry {}/{}",
                    what,
                    e,
                    attempt,
                    policy.max_retries
                );
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff * attempt);
                }
            }
            Err(e) => return Err(e),
        }
    }
}
