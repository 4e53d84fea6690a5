//! Retry logic with linear backoff and cancellable waits.
//!
//! Each job runs through a small state machine:
//!
//! ```text
//! Pending -> Attempting -> Succeeded
//!                       -> WaitingBackoff -> Attempting
//!                       -> Exhausted
//!            WaitingBackoff -> Cancelled
//! ```
//!
//! [`RetryPolicy::should_retry`] decides between another attempt and giving
//! up, and [`wait_backoff`] performs the `WaitingBackoff` step, racing the
//! backoff timer against a [`CancellationToken`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use fetchpool_core::fetch::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(1));
//!
//! match policy.should_retry(1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(1));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::constants::{DEFAULT_BACKOFF_BASE, MAX_BACKOFF};

/// Default maximum attempts per URL.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// How a backoff wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffOutcome {
    /// The full delay elapsed; the next attempt may start.
    Elapsed,
    /// The cancellation token fired first.
    Cancelled,
}

/// Retry configuration with linear backoff.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(attempt * base_delay, MAX_BACKOFF)
/// ```
///
/// With the default 1 second base, waits are 1s, 2s, 3s, ...
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Backoff unit multiplied by the number of attempts used.
    base_delay: Duration,

    /// Cap on a single wait.
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BACKOFF_BASE,
            max_delay: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` attempts in total.
    ///
    /// Zero and one both mean a single attempt with no retry.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_retries.max(1),
            base_delay,
            max_delay: MAX_BACKOFF,
        }
    }

    /// Creates a policy with a custom attempt limit and the default backoff unit.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff unit.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Determines whether another attempt should be made.
    ///
    /// `attempt` is the number of attempts already used (1-indexed).
    #[instrument(level = "debug", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Linear backoff: `attempt * base_delay`, capped at `max_delay`.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(attempt)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Waits for `delay` unless `cancel` fires first.
///
/// A token that is already cancelled returns [`BackoffOutcome::Cancelled`]
/// without sleeping.
pub async fn wait_backoff(delay: Duration, cancel: &CancellationToken) -> BackoffOutcome {
    tokio::select! {
        biased;
        () = cancel.cancelled() => BackoffOutcome::Cancelled,
        () = tokio::time::sleep(delay) => BackoffOutcome::Elapsed,
    }
}
