//! HTTP transport used by the pool.
//!
//! The engine only depends on the [`Fetcher`] trait: one GET, one URL,
//! returning the (size-capped) body and status or a [`FetchError`].
//! [`HttpClient`] is the `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{DEFAULT_TIMEOUT, MAX_BODY_BYTES};
use super::error::FetchError;
use crate::user_agent;

/// Raw outcome of one successful GET.
///
/// Any HTTP status counts as a completed fetch; the status is reported, not
/// judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Body bytes, truncated at [`MAX_BODY_BYTES`].
    pub body: Vec<u8>,
    /// Number of body bytes read.
    pub size: usize,
    /// HTTP status code.
    pub status: u16,
}

impl FetchResponse {
    /// Builds a response, deriving `size` from the body.
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            size: body.len(),
            body,
            status,
        }
    }
}

/// Performs a single GET against a URL.
///
/// Implementations must be shareable across worker tasks.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` once. No retrying happens at this layer.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// `reqwest`-backed [`Fetcher`].
///
/// Created once per run and shared by all workers to reuse pooled
/// connections. The timeout applies to each request as a whole, body
/// included.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the given per-request timeout and optional
    /// User-Agent override.
    ///
    /// A zero timeout falls back to [`DEFAULT_TIMEOUT`]; an empty
    /// User-Agent is treated as unset, in which case the tool's identifying
    /// default is sent.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` if the client cannot be
    /// built (e.g. TLS backend initialisation failure).
    #[instrument(level = "debug", skip(user_agent))]
    pub fn new(timeout: Duration, user_agent: Option<String>) -> Result<Self, reqwest::Error> {
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent::default_fetch_user_agent())
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.filter(|ua| !ua.is_empty()),
            timeout,
        })
    }

    /// Returns the effective per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the configured User-Agent override, if any.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Returns the inner reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::request_construction(url, e.to_string()))?;

        let mut request = self.client.get(parsed);
        // A malformed header fails this request only.
        if let Some(ua) = &self.user_agent {
            request = request.header(USER_AGENT, ua.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let body = read_capped_body(response, url).await?;

        debug!(status, bytes = body.len(), "fetch complete");

        Ok(FetchResponse::new(status, body))
    }
}

/// Reads at most [`MAX_BODY_BYTES`] of the response body.
///
/// Bytes beyond the cap are dropped and the connection is released.
async fn read_capped_body(response: reqwest::Response, url: &str) -> Result<Vec<u8>, FetchError> {
    let hint = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0)
        .min(MAX_BODY_BYTES);
    let mut body = Vec::with_capacity(hint);
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::from_reqwest(url, e))?;
        let remaining = MAX_BODY_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            debug!(limit = MAX_BODY_BYTES, "body truncated at read limit");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
