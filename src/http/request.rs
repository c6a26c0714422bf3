//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID for tracing
//! - Build the read-only InboundRequest view from the axum request
//! - Extract routing-relevant information (path, scheme, cookies)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The core pipeline only ever sees the InboundRequest view, never the
//!   framework request
//! - The authenticated username comes from a request extension placed by a
//!   fronting auth layer; this crate never decides who is logged in

use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::proxy::cookies::parse_cookie_header;
use crate::proxy::InboundRequest;

/// Correlation ID header propagated to the origin.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Username extension inserted by a fronting auth middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Layer that stamps a UUID v4 request ID on requests lacking one.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

/// Build the InboundRequest view consumed by the transformation pipeline.
pub fn inbound_from_parts(parts: &Parts, body: Bytes) -> InboundRequest {
    let full_path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    // The listener itself never terminates TLS; a fronting layer announces
    // the original scheme via X-Forwarded-Proto.
    let is_secure = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false);

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect();

    let cookies = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| parse_cookie_header(&String::from_utf8_lossy(value.as_bytes())))
        .collect();

    let authenticated_username = parts
        .extensions
        .get::<AuthenticatedUser>()
        .map(|user| user.0.clone());

    InboundRequest {
        method: parts.method.as_str().to_string(),
        full_path,
        is_secure,
        headers,
        cookies,
        body,
        authenticated_username,
    }
}

/// Externally visible host of the inbound request, used when masking
/// redirect locations.
pub fn client_host(parts: &Parts) -> String {
    parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}
