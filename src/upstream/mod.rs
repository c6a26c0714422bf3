//! Upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! target URL + outbound HeaderBag + buffered body
//!     → client.rs (pooled client, one request, no redirects)
//!     → OriginResponse (status, folded headers, buffered body)
//! ```
//!
//! # Design Decisions
//! - One shared pooled client handle, injected into server state
//! - Redirects are returned to the rewriter, never followed here
//! - Failures surface as UpstreamError; the transform core never sees them

pub mod client;

pub use client::{OriginClient, UpstreamError};
