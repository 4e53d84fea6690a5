//! Fetchpool Core Library
//!
//! Bounded-concurrency URL fetching: a fixed pool of workers drains a shared
//! job queue, fetching each URL with a per-attempt timeout, linear retry
//! backoff that can be cancelled, and an optional per-worker rate limit.
//! Every submitted URL yields exactly one [`FetchResult`], and run-wide
//! [`Stats`] can be read at any point.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - HTTP transport, error taxonomy, retry policy, rate limiting
//! - [`pool`] - Dispatcher, workers, results and statistics
//!
//! Reporting and argument parsing live in the `fetchpool` binary.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod pool;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use fetch::{
    DEFAULT_MAX_RETRIES, FetchError, FetchResponse, Fetcher, HttpClient, MAX_BODY_BYTES,
    RateLimiter, RetryDecision, RetryPolicy,
};
pub use pool::{
    ConfigError, DEFAULT_WORKERS, FetchResult, ResultStream, Scraper, ScraperConfig, Stats,
    StatsAggregator,
};
pub use tokio_util::sync::CancellationToken;
