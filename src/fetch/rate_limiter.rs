//! Per-worker request pacing.
//!
//! Each worker owns one [`RateLimiter`]. It enforces a minimum interval
//! between the starts of that worker's consecutive jobs; it does not
//! coordinate across workers, so a pool of N workers may issue up to N
//! requests per interval.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use fetchpool_core::fetch::RateLimiter;
//!
//! # async fn example() {
//! let mut limiter = RateLimiter::new(Duration::from_millis(100));
//!
//! // First request proceeds immediately
//! limiter.acquire().await;
//!
//! // Second request waits until 100ms have passed since the first
//! limiter.acquire().await;
//! # }
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// Warning threshold for cumulative delay applied by one worker (30 seconds).
const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

/// Minimum-interval pacer owned by a single worker.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between the starts of consecutive requests.
    interval: Duration,

    /// Time the previous request was released. `None` until the first one.
    last_request: Option<Instant>,

    /// Total delay applied so far.
    cumulative_delay: Duration,

    /// Whether the cumulative warning was already emitted.
    warned: bool,
}

impl RateLimiter {
    /// Creates a pacer with the given interval. A zero interval disables it.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: None,
            cumulative_delay: Duration::ZERO,
            warned: false,
        }
    }

    /// Creates a pacer that never delays.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether pacing is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.interval.is_zero()
    }

    /// Returns the configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the total delay this pacer has imposed.
    #[must_use]
    pub fn cumulative_delay(&self) -> Duration {
        self.cumulative_delay
    }

    /// Waits until the interval since the previous request has passed.
    ///
    /// The first call never waits.
    pub async fn acquire(&mut self) {
        if self.is_disabled() {
            return;
        }

        if let Some(last_request) = self.last_request {
            let elapsed = last_request.elapsed();
            if elapsed < self.interval {
                let delay = self.interval.saturating_sub(elapsed);
                self.cumulative_delay += delay;

                debug!(
                    delay_ms = delay.as_millis(),
                    cumulative_ms = self.cumulative_delay.as_millis(),
                    "applying rate limit delay"
                );

                if !self.warned && self.cumulative_delay >= CUMULATIVE_DELAY_WARNING_THRESHOLD {
                    self.warned = true;
                    warn!(
                        cumulative_delay_secs = self.cumulative_delay.as_secs(),
                        "excessive rate limiting - consider more workers or a shorter interval"
                    );
                }

                tokio::time::sleep(delay).await;
            }
        } else {
            debug!("first request for this worker - no delay");
        }

        self.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_limiter_reports_disabled() {
        let limiter = RateLimiter::disabled();
        assert!(limiter.is_disabled());
        assert_eq!(limiter.interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let mut limiter = RateLimiter::new(Duration::from_secs(5));
        let start = std::time::Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.cumulative_delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        let start = std::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(
            start.elapsed() >= Duration::from_millis(100),
            "three acquires should span two intervals, took {:?}",
            start.elapsed()
        );
        assert!(limiter.cumulative_delay() > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_no_delay_when_interval_already_elapsed() {
        let mut limiter = RateLimiter::new(Duration::from_millis(10));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        let start = std::time::Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        let mut limiter = RateLimiter::disabled();
        let start = std::time::Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(limiter.cumulative_delay(), Duration::ZERO);
    }
}
