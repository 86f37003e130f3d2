//! Connect Retry Module
//!
//! Exponential backoff used while establishing the cache connection.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry budget for establishing a connection.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Delay to wait before attempt number `attempt` (zero-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Runs `f` until it succeeds or the budget is spent.
    ///
    /// On failure returns the last error and the number of attempts made.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, (E, u32)>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let delay = self.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match f().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    debug!("Attempt {}/{} failed: {}", attempt, attempts, e);
                    if attempt >= attempts {
                        return Err((e, attempt));
                    }
                }
            }
        }
    }
}
