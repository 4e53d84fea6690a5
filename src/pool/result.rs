//! Per-URL outcome record.

use std::time::{Duration, SystemTime};

use crate::fetch::FetchError;

/// Terminal outcome for one URL after its retry loop ends.
///
/// Produced exactly once per submitted URL. Carries every field a report
/// needs: URL, outcome, size, duration, status, worker and retry count.
#[derive(Debug)]
pub struct FetchResult {
    /// The URL that was fetched.
    pub url: String,
    /// Body bytes (capped at 1 MiB). `None` on failure.
    pub body: Option<Vec<u8>>,
    /// Number of body bytes. Zero on failure.
    pub size: usize,
    /// Failure cause. `None` on success.
    pub error: Option<FetchError>,
    /// Elapsed time of the final attempt.
    pub duration: Duration,
    /// HTTP status, or 0 if none was obtained.
    pub status: u16,
    /// Identifier of the worker that produced this result.
    pub worker_id: usize,
    /// Attempts consumed minus one.
    pub retries: u32,
    /// When the worker finished this URL.
    pub completed_at: SystemTime,
}

impl FetchResult {
    /// Returns true if the final attempt succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns true if the retry loop was cancelled during a backoff wait.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(FetchError::is_cancelled)
    }

    /// Number of fetch attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}
