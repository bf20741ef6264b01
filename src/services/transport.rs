//! Network seam.
//!
//! The fetcher and joiner only ever issue GETs; everything they need from
//! the network goes through [`Transport`]. [`HttpTransport`] is the
//! production implementation on top of reqwest.

use crate::error::{TransportError, TransportResult};
use std::future::Future;

/// A completed HTTP exchange. Non-success statuses are still responses;
/// deciding what they mean is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues GET requests.
///
/// Implementations must be shareable across tasks; the returned future is
/// spawned onto the runtime.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = TransportResult<Response>> + Send;
}

/// reqwest-backed transport. Cloning shares the connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> TransportResult<Response> {
        let http_err = |source| TransportError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(http_err)?;

        tracing::trace!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(Response {
            status,
            body: body.to_vec(),
        })
    }
}
