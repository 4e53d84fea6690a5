//! Pool worker: drain the job queue, fetch with retries, emit one result per URL.
//!
//! A worker loops until the shared job queue is closed and empty. For each
//! URL it waits on its own [`RateLimiter`], runs the retry loop, stamps the
//! outcome and sends it on the result channel. A fetch failure is recorded
//! on the result; it never stops the worker.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::result::FetchResult;
use crate::fetch::{
    BackoffOutcome, FetchError, FetchResponse, Fetcher, RateLimiter, RetryDecision, RetryPolicy,
    wait_backoff,
};

/// Receiving side of the job queue, shared by every worker in the pool.
///
/// The lock is held only while taking the next URL, never across a fetch
/// or a sleep.
pub(crate) type JobQueue = Arc<Mutex<mpsc::Receiver<String>>>;

pub(crate) struct Worker {
    id: usize,
    fetcher: Arc<dyn Fetcher>,
    retry_policy: RetryPolicy,
    rate_limiter: RateLimiter,
    jobs: JobQueue,
    results: mpsc::Sender<FetchResult>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        fetcher: Arc<dyn Fetcher>,
        retry_policy: RetryPolicy,
        rate_limiter: RateLimiter,
        jobs: JobQueue,
        results: mpsc::Sender<FetchResult>,
    ) -> Self {
        Self {
            id,
            fetcher,
            retry_policy,
            rate_limiter,
            jobs,
            results,
        }
    }

    /// Runs until the job queue is drained. Returns the number of jobs handled.
    #[instrument(level = "debug", skip_all, fields(worker_id = self.id))]
    pub(crate) async fn run(mut self, cancel: CancellationToken) -> usize {
        let mut handled = 0usize;
        debug!("worker started");

        loop {
            let next = self.jobs.lock().await.recv().await;
            let Some(url) = next else {
                break;
            };

            self.rate_limiter.acquire().await;

            let result = self.process(url, &cancel).await;
            handled += 1;

            if self.results.send(result).await.is_err() {
                debug!("result stream dropped, worker stopping");
                break;
            }
        }

        debug!(handled, "worker finished");
        handled
    }

    /// Runs the retry loop for one URL to a terminal state.
    #[instrument(level = "debug", skip(self, cancel), fields(worker_id = self.id))]
    async fn process(&self, url: String, cancel: &CancellationToken) -> FetchResult {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting fetch");

            let start = Instant::now();
            let outcome = self.fetcher.fetch(&url).await;
            let elapsed = start.elapsed();

            let error = match outcome {
                Ok(response) => return self.finish(url, Ok(response), elapsed, attempt),
                Err(e) => e,
            };

            match self.retry_policy.should_retry(attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    info!(
                        url = %url,
                        attempt = next_attempt,
                        max_attempts = self.retry_policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying fetch"
                    );

                    if wait_backoff(delay, cancel).await == BackoffOutcome::Cancelled {
                        warn!(url = %url, attempt, "cancelled during backoff");
                        let cancelled = FetchError::cancelled(url.as_str());
                        return self.finish(url, Err(cancelled), elapsed, attempt);
                    }
                }
                RetryDecision::DoNotRetry { reason } => {
                    warn!(url = %url, attempt, %reason, error = %error, "fetch failed");
                    return self.finish(url, Err(error), elapsed, attempt);
                }
            }
        }
    }

    fn finish(
        &self,
        url: String,
        outcome: Result<FetchResponse, FetchError>,
        duration: std::time::Duration,
        attempts: u32,
    ) -> FetchResult {
        let (body, size, status, error) = match outcome {
            Ok(response) => (Some(response.body), response.size, response.status, None),
            Err(e) => (None, 0, 0, Some(e)),
        };

        FetchResult {
            url,
            body,
            size,
            error,
            duration,
            status,
            worker_id: self.id,
            retries: attempts.saturating_sub(1),
            completed_at: SystemTime::now(),
        }
    }
}
