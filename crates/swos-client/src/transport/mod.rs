//! HTTP transports for SwOS endpoints
//!
//! Some SwOS firmware rejects one HTTP client's connection/header behaviour
//! while accepting another's. Requests therefore go through two
//! independently implemented transports:
//!
//! - [`PooledTransport`]: async reqwest client with a connection pool
//! - [`BlockingTransport`]: reqwest blocking client on the blocking pool
//!
//! [`FallbackTransport`] tries them in that order and turns any failure
//! into "endpoint unavailable".

mod blocking;
mod fallback;
mod pooled;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{Result, SwosClientError};

pub use blocking::BlockingTransport;
pub use fallback::FallbackTransport;
pub use pooled::PooledTransport;

/// One way of issuing a digest-authenticated GET
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the body at `url`.
    ///
    /// Fails on network errors, timeouts, non-2xx statuses and empty or
    /// whitespace-only bodies.
    async fn fetch(&self, url: &Url) -> Result<String>;

    /// Release pooled resources. Later fetches fail with `Closed`.
    fn close(&self) {}
}

/// Maximum characters of a body shown in debug logs
const PREVIEW_LEN: usize = 120;

/// Apply the shared success rule to a finished response
pub(crate) fn accept_body(
    transport: &str,
    url: &Url,
    status: reqwest::StatusCode,
    body: String,
) -> Result<String> {
    let endpoint = url.path().trim_start_matches('/');
    let preview: String = body
        .chars()
        .take(PREVIEW_LEN)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    debug!(
        "{} {} -> {} bytes, status={}, head={:?}",
        transport,
        endpoint,
        body.len(),
        status.as_u16(),
        preview
    );

    if !status.is_success() {
        return Err(SwosClientError::status(status.as_u16(), endpoint));
    }
    if body.trim().is_empty() {
        return Err(SwosClientError::EmptyBody(endpoint.to_string()));
    }
    Ok(body)
}

/// Map reqwest timeouts onto the dedicated error variant
pub(crate) fn classify(err: reqwest::Error) -> SwosClientError {
    if err.is_timeout() {
        SwosClientError::Timeout
    } else {
        SwosClientError::HttpError(err)
    }
}
