//! Error types for the fetch module.
//!
//! Every variant is a per-attempt outcome for a single URL. None of them
//! abort the pool; the worker records the final one on the job's result.

use thiserror::Error;

/// Errors that can occur while fetching a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The attempt exceeded the configured timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The request could not be built (malformed URL or header).
    #[error("invalid request for {url}: {reason}")]
    RequestConstruction {
        /// The URL the request was built for.
        url: String,
        /// Why construction failed.
        reason: String,
    },

    /// The run was cancelled while waiting to retry.
    #[error("cancelled while waiting to retry {url}")]
    Cancelled {
        /// The URL whose retry loop was cancelled.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a request construction error.
    pub fn request_construction(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RequestConstruction {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Maps a reqwest error to the matching variant.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else if source.is_builder() {
            Self::request_construction(url, source.to_string())
        } else {
            Self::network(url, source)
        }
    }

    /// Returns true if the retry loop was cut short by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if the attempt ran past its timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the URL this error belongs to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::RequestConstruction { url, .. }
            | Self::Cancelled { url } => url,
        }
    }
}

// No `From<reqwest::Error>`: every variant needs the URL for context, which
// the source error does not carry. Use `from_reqwest` instead.
