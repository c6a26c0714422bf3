//! Reverse proxy that masks a configured origin server behind the
//! externally visible host.

pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::HttpServer;
