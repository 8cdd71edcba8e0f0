//! Readiness Poller
//!
//! Waits for an asynchronously provisioned resource to reach its ready state
//! by polling a describe call at a fixed interval, up to a bounded number of
//! polls.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Polling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two describe calls
    pub interval: Duration,

    /// Maximum number of describe calls before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

/// Polls a describe operation until a target state is reported.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
    config: PollConfig,
}

impl ReadinessPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Poll `describe` until it reports `target`.
    ///
    /// Returns the number of describe calls made. A state listed in
    /// `failed_states` ends polling with [`CloudError::ResourceFailed`];
    /// reaching `max_attempts` ends it with [`CloudError::Timeout`].
    pub async fn await_ready<F, Fut>(
        &self,
        what: &str,
        id: &str,
        target: &str,
        failed_states: &[&str],
        mut describe: F,
    ) -> Result<u32>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let state = describe().await?;
            tracing::debug!("{} {} state: {} ({}/{})", what, id, state, attempt, max_attempts);

            if state == target {
                return Ok(attempt);
            }
            if failed_states.contains(&state.as_str()) {
                return Err(CloudError::ResourceFailed {
                    what: what.to_string(),
                    id: id.to_string(),
                    state,
                });
            }

            if attempt < max_attempts {
                sleep(self.config.interval).await;
            }
        }

        Err(CloudError::Timeout {
            what: what.to_string(),
            id: id.to_string(),
            target: target.to_string(),
            attempts: max_attempts,
        })
    }
}
