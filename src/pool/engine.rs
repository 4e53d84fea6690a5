//! Fetch pool for concurrent URL retrieval with retry support.
//!
//! [`Scraper`] owns the job queue and the result stream. A run starts a
//! fixed number of worker tasks that all drain the same queue, and closes
//! the stream once every worker has exited.
//!
//! # Concurrency Model
//!
//! - The job queue is a bounded channel sized to the URL count, so filling
//!   it never blocks
//! - Exactly `worker_count` Tokio tasks share its receiver
//! - Every URL yields exactly one [`FetchResult`], in completion order
//! - A supervisor task joins all workers, then drops the last result sender
//! - Stats are recorded as results are read off the stream
//!
//! # Example
//!
//! ```no_run
//! use fetchpool_core::{Scraper, ScraperConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = Scraper::new(ScraperConfig::default().with_max_workers(3))?;
//! let results = scraper
//!     .scrape_urls(["https://example.com/", "https://example.org/"])
//!     .await;
//! let stats = scraper.stats();
//! println!("{} ok, {} failed", stats.success_requests, stats.failed_requests);
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::config::{ConfigError, ScraperConfig};
use super::result::FetchResult;
use super::stats::{Stats, StatsAggregator};
use super::worker::Worker;
use crate::fetch::{Fetcher, HttpClient, RateLimiter, RetryPolicy};

/// Bounded-concurrency URL fetcher.
///
/// Stats accumulate across runs on the same scraper until
/// [`reset_stats`](Self::reset_stats) is called.
pub struct Scraper {
    config: ScraperConfig,
    fetcher: Arc<dyn Fetcher>,
    retry_policy: RetryPolicy,
    stats: Arc<StatsAggregator>,
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("config", &self.config)
            .field("retry_policy", &self.retry_policy)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl Scraper {
    /// Creates a scraper using the `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    #[instrument(level = "debug")]
    pub fn new(config: ScraperConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let client = HttpClient::new(config.timeout, config.user_agent.clone())?;
        Ok(Self::build(config, Arc::new(client)))
    }

    /// Creates a scraper over any [`Fetcher`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_fetcher(
        config: ScraperConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::build(config.validated()?, fetcher))
    }

    fn build(config: ScraperConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let retry_policy = RetryPolicy::new(config.max_retries, config.backoff_base);

        debug!(
            max_workers = config.max_workers,
            timeout_ms = config.timeout.as_millis(),
            max_attempts = retry_policy.max_attempts(),
            rate_limit_ms = config.rate_limit.as_millis(),
            "creating scraper"
        );

        Self {
            config,
            fetcher,
            retry_policy,
            stats: Arc::new(StatsAggregator::new()),
        }
    }

    /// Returns the validated configuration.
    #[must_use]
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Returns the retry policy derived from the configuration.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns a snapshot of the run statistics. Safe to call mid-run.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    /// Clears accumulated statistics.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Starts a run and returns the stream of results.
    ///
    /// Must be called from within a Tokio runtime. `cancel` is observed only
    /// while a job waits to retry; in-flight fetches run to their timeout.
    /// Results arrive in completion order; the stream ends after the last
    /// worker exits.
    #[instrument(
        skip(self, urls, cancel),
        fields(url_count = tracing::field::Empty, workers = tracing::field::Empty)
    )]
    pub fn run<I>(&self, urls: I, cancel: CancellationToken) -> ResultStream
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let worker_count = self.config.worker_count(urls.len());
        let span = tracing::Span::current();
        span.record("url_count", urls.len());
        span.record("workers", worker_count);

        let (result_tx, result_rx) = mpsc::channel(urls.len().max(1));

        if urls.is_empty() {
            debug!("no URLs submitted");
            return ResultStream::new(result_rx, Arc::clone(&self.stats));
        }

        let (job_tx, job_rx) = mpsc::channel::<String>(urls.len());
        let jobs = Arc::new(Mutex::new(job_rx));

        info!(urls = urls.len(), workers = worker_count, "starting fetch pool");

        let mut handles: Vec<JoinHandle<usize>> = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&self.fetcher),
                self.retry_policy.clone(),
                RateLimiter::new(self.config.rate_limit),
                Arc::clone(&jobs),
                result_tx.clone(),
            );
            handles.push(tokio::spawn(worker.run(cancel.clone())));
        }

        for url in urls {
            let queued = job_tx.try_send(url);
            // Capacity equals the URL count and the receiver is alive, so
            // every URL is accepted.
            debug_assert!(queued.is_ok(), "job queue rejected a URL");
        }
        drop(job_tx);

        tokio::spawn(async move {
            let mut handled = 0usize;
            for handle in handles {
                match handle.await {
                    Ok(count) => handled += count,
                    // A panicked worker does not stop the others.
                    Err(e) => warn!(error = %e, "worker task panicked"),
                }
            }
            drop(result_tx);
            debug!(handled, "all workers finished, closing result stream");
        });

        ResultStream::new(result_rx, Arc::clone(&self.stats))
    }

    /// Fetches every URL and collects the results.
    pub async fn scrape_urls<I>(&self, urls: I) -> Vec<FetchResult>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.scrape_urls_with_cancel(urls, CancellationToken::new())
            .await
    }

    /// Fetches every URL under a cancellation token and collects the results.
    pub async fn scrape_urls_with_cancel<I>(
        &self,
        urls: I,
        cancel: CancellationToken,
    ) -> Vec<FetchResult>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let results = self.run(urls, cancel).collect_all().await;

        let stats = self.stats.snapshot();
        info!(
            results = results.len(),
            success = stats.success_requests,
            failed = stats.failed_requests,
            total_bytes = stats.total_bytes,
            "fetch pool complete"
        );

        results
    }
}

/// Results of one run, in completion order.
///
/// Each result is recorded in the scraper's stats as it is read. Also
/// implements [`Stream`].
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<FetchResult>,
    stats: Arc<StatsAggregator>,
}

impl ResultStream {
    fn new(rx: mpsc::Receiver<FetchResult>, stats: Arc<StatsAggregator>) -> Self {
        Self { rx, stats }
    }

    /// Waits for the next result. `None` once all workers have finished.
    pub async fn recv(&mut self) -> Option<FetchResult> {
        let result = self.rx.recv().await?;
        self.stats.record(&result);
        Some(result)
    }

    /// Drains the stream into a vector.
    pub async fn collect_all(mut self) -> Vec<FetchResult> {
        let mut results = Vec::new();
        while let Some(result) = self.recv().await {
            results.push(result);
        }
        results
    }
}

impl Stream for ResultStream {
    type Item = FetchResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(result)) => {
                this.stats.record(&result);
                Poll::Ready(Some(result))
            }
            other => other,
        }
    }
}
