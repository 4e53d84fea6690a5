//! Run configuration for the fetch pool.

use std::time::Duration;

use crate::fetch::DEFAULT_MAX_RETRIES;
use crate::fetch::constants::{DEFAULT_BACKOFF_BASE, DEFAULT_TIMEOUT};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Errors detected while validating a [`ScraperConfig`].
///
/// These are the only run-fatal errors; they are raised before any job
/// starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Backoff unit of zero would retry in a tight loop.
    #[error("invalid backoff base: must be greater than zero")]
    ZeroBackoff,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Settings for one scrape run. Immutable once the run starts.
///
/// # Default Values
///
/// - `max_workers`: 5 (0 means one worker per URL)
/// - `timeout`: 30 seconds (0 means the default)
/// - `user_agent`: unset
/// - `max_retries`: 3 (0 or 1 means a single attempt)
/// - `rate_limit`: disabled
/// - `backoff_base`: 1 second
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Worker pool size. Zero starts one worker per URL.
    pub max_workers: usize,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// User-Agent header override.
    pub user_agent: Option<String>,
    /// Maximum attempts per URL.
    pub max_retries: u32,
    /// Minimum spacing between one worker's consecutive jobs.
    pub rate_limit: Duration,
    /// Backoff unit; the wait after attempt `n` is `n * backoff_base`.
    pub backoff_base: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit: Duration::ZERO,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl ScraperConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker pool size. Zero starts one worker per URL.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Sets the per-attempt timeout. Zero falls back to the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent header. An empty value is treated as unset.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the maximum attempts per URL. 0 and 1 both mean one attempt.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the minimum spacing between one worker's jobs. Zero disables it.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the backoff unit; must be non-zero.
    #[must_use]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Applies defaults for zero values and rejects invalid settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBackoff`] if `backoff_base` is zero.
    /// `max_retries` has no upper bound.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.backoff_base.is_zero() {
            return Err(ConfigError::ZeroBackoff);
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.user_agent.as_deref().is_some_and(str::is_empty) {
            self.user_agent = None;
        }
        Ok(self)
    }

    /// Number of workers a run over `url_count` URLs starts.
    #[must_use]
    pub fn worker_count(&self, url_count: usize) -> usize {
        if self.max_workers == 0 {
            url_count
        } else {
            self.max_workers
        }
    }
}
