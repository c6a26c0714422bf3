//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → request.rs (request ID, InboundRequest view extraction)
//!     → [proxy pipeline transforms, upstream client forwards]
//!     → server.rs (ProxyResponse serialization, cookie expiry)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{AuthenticatedUser, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
