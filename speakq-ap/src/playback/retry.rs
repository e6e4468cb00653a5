//! Retry policy for transient synthesis failures
//!
//! Fixed attempt count, fixed delay between attempts (never after the last).
//! Errors are classified with [`Error::is_transient`]; anything else stops the
//! loop immediately without consuming the remaining attempts.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Retry wrapper around a fallible async operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

/// Result of running an operation under a [`RetryPolicy`]
#[derive(Debug)]
pub struct Attempted<T> {
    /// Final value, or the definitive failure
    pub result: Result<T>,
    /// Attempts made, including the last one
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.delay_secs))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `operation` receives the 1-based attempt number. Exhaustion is reported
    /// as [`Error::RetriesExhausted`] wrapping the last transient error; this
    /// method never panics or propagates beyond the returned value.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Attempted<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts: attempt,
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!("Attempt {} of {} failed: {}", attempt, self.max_attempts, e);

                    if attempt >= self.max_attempts {
                        error!("Max retries reached. Failed to convert text to speech.");
                        return Attempted {
                            result: Err(Error::RetriesExhausted {
                                attempts: attempt,
                                last: Box::new(e),
                            }),
                            attempts: attempt,
                        };
                    }

                    warn!("Retrying in {} seconds...", self.delay.as_secs_f64());
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Attempted {
                        result: Err(e),
                        attempts: attempt,
                    }
                }
            }
        }
    }
}
