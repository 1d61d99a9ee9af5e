//! Bounded retry with linearly increasing backoff

use std::future::Future;
use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between
///
/// After failed attempt `k` (counting from zero) the policy waits
/// `backoff * (k + 1)` before trying again. There is no wait after the final
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Base delay, multiplied by the attempt number
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to at least one
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after failed attempt `attempt`, or `None` if it was the last
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts.max(1) {
            None
        } else {
            Some(self.backoff * (attempt + 1))
        }
    }

    /// Runs `op` until it succeeds, the attempts run out, or `on_error` declines
    ///
    /// `op` receives the zero-based attempt number. `on_error` is called with
    /// every failure and returns whether the error is worth another attempt.
    /// The last error is returned when the policy gives up.
    pub async fn run<T, E, F, Fut, C>(&self, mut op: F, mut on_error: C) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FnMut(u32, &E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retry = on_error(attempt, &err);
                    match self.delay_after(attempt) {
                        Some(delay) if retry => {
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        _ => return Err(err),
                    }
                }
            }
        }
    }
}
