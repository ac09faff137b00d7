//! Eventual-consistency waits.
//!
//! Writes to the Incapsula API are not immediately visible to reads. Before a
//! handler trusts freshly written remote state it waits a minimum propagation
//! window and then polls with capped exponential backoff until the write is
//! visible or the wait budget runs out. Waits are cancellable.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{ProviderError, Result};

/// Lower bound between two visibility checks, so a zero backoff never spins.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for a remote write to become visible.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationPolicy {
    /// Minimum time between a write and the first read of it
    pub min_window: Duration,
    /// Backoff before the second check
    pub initial_backoff: Duration,
    /// Maximum backoff (cap for exponential growth)
    pub max_backoff: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 for doubling)
    pub backoff_multiplier: f64,
    /// Polling budget after the minimum window
    pub timeout: Duration,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self {
            min_window: Duration::from_secs(3),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            timeout: Duration::from_secs(30),
        }
    }
}

impl PropagationPolicy {
    /// A policy that checks exactly once without waiting.
    pub fn immediate() -> Self {
        Self {
            min_window: Duration::ZERO,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            timeout: Duration::ZERO,
        }
    }

    /// Calculate the backoff duration for a given attempt number (0-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32 - 1);
        let backoff_ms = self.initial_backoff.as_millis() as f64 * multiplier;
        let capped_ms = backoff_ms.min(self.max_backoff.as_millis() as f64);

        Duration::from_millis(capped_ms as u64)
    }

    /// Worst-case time spent sleeping, excluding check latency.
    pub fn max_total_wait(&self) -> Duration {
        self.min_window + self.timeout
    }
}

/// Result of a propagation wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The check reported the write as visible
    Visible { attempts: u32 },
    /// The budget ran out first; the caller proceeds and surfaces whatever it reads
    TimedOut { attempts: u32 },
}

impl WaitOutcome {
    pub fn is_visible(&self) -> bool {
        matches!(self, WaitOutcome::Visible { .. })
    }
}

/// Wait the policy's minimum window, then poll `is_visible` until it returns true
/// or the timeout elapses.
///
/// The check runs at least once. Returns [`ProviderError::Cancelled`] if the
/// token fires during any sleep.
pub async fn wait_until_visible<F, Fut>(
    policy: &PropagationPolicy,
    cancel: &CancellationToken,
    operation: &str,
    mut is_visible: F,
) -> Result<WaitOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    sleep_or_cancel(policy.min_window, cancel, operation).await?;

    let deadline = Instant::now() + policy.timeout;
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::TimedOut { attempts: attempt });
            }
            let backoff = policy.backoff_for_attempt(attempt).max(MIN_POLL_INTERVAL);
            debug!(
                operation = %operation,
                attempt,
                backoff_ms = backoff.min(remaining).as_millis() as u64,
                "Remote write not visible yet, backing off"
            );
            sleep_or_cancel(backoff.min(remaining), cancel, operation).await?;
        }

        attempt += 1;
        if is_visible().await {
            return Ok(WaitOutcome::Visible { attempts: attempt });
        }

        if Instant::now() >= deadline {
            return Ok(WaitOutcome::TimedOut { attempts: attempt });
        }
    }
}

async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
    operation: &str,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ProviderError::cancelled(operation));
    }
    if duration.is_zero() {
        return Ok(());
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::cancelled(operation)),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
