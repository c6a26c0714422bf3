//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (priority-ordered prefix scan)
//!     → Return: matched Route (with its OriginTarget) or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Sort by priority
//!     → Parse origins into OriginTargets
//!     → Freeze as immutable ProxyRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins (ordered by priority, then config order)

pub mod router;

pub use router::{ProxyRouter, Route};
