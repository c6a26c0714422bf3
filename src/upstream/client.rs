//! HTTP client for origin servers.
//!
//! # Responsibilities
//! - Issue exactly one request per call against the target URL
//! - Translate between HeaderBag and wire headers
//! - Buffer the whole response body
//!
//! # Design Decisions
//! - One pooled client reused across requests; pool thread-safety is the
//!   client library's concern
//! - Redirects are never followed; 3xx responses go back to the rewriter
//! - Repeated response headers (Set-Cookie) fold into one comma-joined
//!   value, the mapping shape the rewriter consumes
//! - No timeout here; the server's request timeout bounds the whole exchange

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::proxy::headers::{canonical_header_name, HeaderBag};
use crate::proxy::OriginResponse;

/// Error from a failed upstream exchange. The server layer maps all of
/// these to 502; the transformation core only ever sees a completed
/// OriginResponse.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid request method {0:?}")]
    InvalidMethod(String),

    #[error("origin request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Shared handle to the pooled upstream client.
#[derive(Clone)]
pub struct OriginClient {
    inner: reqwest::Client,
}

impl OriginClient {
    pub fn new() -> Self {
        // The rewriter must see 301/302 responses, so the client never
        // follows them itself.
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("origin client construction failed");
        Self { inner }
    }

    /// Issue one request and buffer the full response.
    pub async fn request(
        &self,
        target_url: &str,
        method: &str,
        headers: &HeaderBag,
        body: Bytes,
    ) -> Result<OriginResponse, UpstreamError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| UpstreamError::InvalidMethod(method.to_string()))?;

        let mut wire_headers = HeaderMap::new();
        for (name, value) in headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes());
            let value = HeaderValue::from_str(value);
            if let (Ok(name), Ok(value)) = (name, value) {
                wire_headers.append(name, value);
            }
        }

        let response = self
            .inner
            .request(method, target_url)
            .headers(wire_headers)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();

        let mut headers = HeaderBag::new();
        for (name, value) in response.headers().iter() {
            let canonical = canonical_header_name(name.as_str());
            let text = String::from_utf8_lossy(value.as_bytes()).to_string();
            headers.append_joined(&canonical, &text);
        }

        let body = response.bytes().await?;

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for OriginClient {
    fn default() -> Self {
        Self::new()
    }
}
