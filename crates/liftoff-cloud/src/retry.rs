//! Retrying Executor
//!
//! Functions can reject a freshly created execution role for a short while
//! after the role exists. Operations that hit this window are retried with a
//! fixed delay; every other failure propagates on the first attempt.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration for operations that depend on just-created identities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryConfig {
    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` is used up.
    ///
    /// Exhaustion surfaces the last error wrapped in
    /// [`CloudError::RetriesExhausted`], which is always fatal.
    pub async fn with_retry<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "{} failed ({}), retrying in {:?} ({}/{})",
                        what,
                        e,
                        self.delay,
                        attempt,
                        max_attempts
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(CloudError::RetriesExhausted {
                        what: what.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
