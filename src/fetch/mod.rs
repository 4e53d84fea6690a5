//! Single-URL fetching: transport, errors, retry and pacing.
//!
//! This module provides the building blocks a pool worker composes for each
//! job:
//!
//! - [`Fetcher`] / [`HttpClient`] - one GET with a timeout, body capped at 1 MiB
//! - [`RetryPolicy`] / [`wait_backoff`] - linear backoff, cancellable waits
//! - [`RateLimiter`] - per-worker minimum spacing between requests
//! - [`FetchError`] - network, timeout, request construction, cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use fetchpool_core::fetch::{Fetcher, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Duration::from_secs(10), None)?;
//! let response = client.fetch("https://example.com/").await?;
//! println!("HTTP {} ({} bytes)", response.status, response.size);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod rate_limiter;
mod retry;

pub use client::{FetchResponse, Fetcher, HttpClient};
pub use constants::{DEFAULT_TIMEOUT, MAX_BODY_BYTES};
pub use error::FetchError;
pub use rate_limiter::RateLimiter;
pub use retry::{BackoffOutcome, DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy, wait_backoff};

// Note: no module-local Result alias. Use `Result<T, FetchError>` explicitly.
