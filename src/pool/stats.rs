//! Run-wide statistics.
//!
//! Results arrive from many workers, so all counters live behind one mutex
//! and are updated together. Readers get a [`Stats`] copy, never a live
//! reference, so a snapshot never observes a half-applied record.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::result::FetchResult;

/// Point-in-time copy of the run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Results observed.
    pub total_requests: usize,
    /// Results without an error.
    pub success_requests: usize,
    /// Results with an error.
    pub failed_requests: usize,
    /// Sum of successful body sizes.
    pub total_bytes: u64,
    /// Sum of successful final-attempt durations.
    pub total_duration: Duration,
}

impl Stats {
    /// Mean duration of successful fetches.
    #[must_use]
    pub fn average_duration(&self) -> Duration {
        u32::try_from(self.success_requests)
            .ok()
            .filter(|n| *n > 0)
            .map_or(Duration::ZERO, |n| self.total_duration / n)
    }

    /// Fraction of results that succeeded (0.0 - 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.success_requests as f64 / self.total_requests as f64
        }
    }

    fn apply(&mut self, result: &FetchResult) {
        self.total_requests += 1;
        if result.is_success() {
            self.success_requests += 1;
            self.total_bytes += result.size as u64;
            self.total_duration += result.duration;
        } else {
            self.failed_requests += 1;
        }
    }
}

/// Mutex-guarded accumulator shared by the result stream and callers.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<Stats>,
}

impl StatsAggregator {
    /// Creates an aggregator with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one result into the counters.
    pub fn record(&self, result: &FetchResult) {
        self.lock().apply(result);
    }

    /// Returns a consistent copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> Stats {
        *self.lock()
    }

    /// Clears all counters.
    pub fn reset(&self) {
        *self.lock() = Stats::default();
    }

    // A panic while holding the lock cannot leave the counters half-updated
    // (`apply` has no panicking paths), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Stats> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::SystemTime;

    use super::*;
    use crate::fetch::FetchError;

    fn success(size: usize, millis: u64) -> FetchResult {
        FetchResult {
            url: "https://example.com/ok".to_string(),
            body: Some(vec![0; size]),
            size,
            error: None,
            duration: Duration::from_millis(millis),
            status: 200,
            worker_id: 0,
            retries: 0,
            completed_at: SystemTime::now(),
        }
    }

    fn failure() -> FetchResult {
        FetchResult {
            url: "https://example.com/bad".to_string(),
            body: None,
            size: 0,
            error: Some(FetchError::timeout("https://example.com/bad")),
            duration: Duration::from_millis(500),
            status: 0,
            worker_id: 1,
            retries: 2,
            completed_at: SystemTime::now(),
        }
    }

    #[test]
    fn test_stats_default() {
        let stats = StatsAggregator::new().snapshot();
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.average_duration(), Duration::ZERO);
        assert!(stats.success_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_success_and_failure() {
        let aggregator = StatsAggregator::new();
        aggregator.record(&success(10, 100));
        aggregator.record(&success(30, 300));
        aggregator.record(&failure());

        let stats = aggregator.snapshot();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.success_requests, 2);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.total_bytes, 40);
        // Failed durations are not counted.
        assert_eq!(stats.total_duration, Duration::from_millis(400));
        assert_eq!(stats.average_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let aggregator = StatsAggregator::new();
        aggregator.record(&success(5, 1));
        let before = aggregator.snapshot();
        aggregator.record(&success(5, 1));
        assert_eq!(before.total_requests, 1);
        assert_eq!(aggregator.snapshot().total_requests, 2);
    }

    #[test]
    fn test_reset_clears_counters() {
        let aggregator = StatsAggregator::new();
        aggregator.record(&failure());
        aggregator.reset();
        assert_eq!(aggregator.snapshot(), Stats::default());
    }

    #[test]
    fn test_stats_thread_safe() {
        use std::thread;

        let aggregator = Arc::new(StatsAggregator::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let aggregator = Arc::clone(&aggregator);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    aggregator.record(&success(2, 1));
                    aggregator.record(&failure());
                    let snap = aggregator.snapshot();
                    assert_eq!(
                        snap.success_requests + snap.failed_requests,
                        snap.total_requests
                    );
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = aggregator.snapshot();
        assert_eq!(stats.total_requests, 2000);
        assert_eq!(stats.success_requests, 1000);
        assert_eq!(stats.failed_requests, 1000);
        assert_eq!(stats.total_bytes, 2000);
        assert!((stats.success_rate() - 0.5).abs() < f64::EPSILON);
    }
}
