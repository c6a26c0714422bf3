//! Core request/response transformation pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest (view built by the http adapter)
//!     → target.rs (resolve target URL on the origin)
//!     → headers.rs (outbound header set: hop-by-hop strip, Host, Cookie)
//!     → [upstream client issues the request]
//!     → response.rs (header copy, redirect masking, cookie expiry)
//!     → ProxyResponse (serialized by the http adapter)
//! ```
//!
//! # Design Decisions
//! - The pipeline is stateless per request; only OriginTarget is shared
//! - Stages are pure functions over plain data, testable without a server
//! - Upstream failures never reach this module; it only sees a completed
//!   OriginResponse

pub mod cookies;
pub mod headers;
pub mod response;
pub mod target;

pub use headers::{build_outbound_headers, HeaderBag};
pub use response::{build_outbound_response, ProxyResponse};
pub use target::OriginTarget;

use axum::body::Bytes;

/// Read-only view of the inbound request, owned by the hosting adapter.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: String,
    /// Path plus query string, exactly as received.
    pub full_path: String,
    pub is_secure: bool,
    /// Headers in arrival order, names in their transport casing.
    pub headers: Vec<(String, String)>,
    /// Parsed cookie jar in appearance order.
    pub cookies: Vec<(String, String)>,
    pub body: Bytes,
    /// Username precomputed by a fronting auth layer, if any.
    pub authenticated_username: Option<String>,
}

/// Completed response from the upstream collaborator.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: HeaderBag,
    pub body: Bytes,
}
