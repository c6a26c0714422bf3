//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route shape (origins non-empty, prefixes rooted)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over ProxyConfig
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("no routes configured; the proxy would answer 404 to everything")]
    NoRoutes,

    #[error("route {0:?} has an empty origin")]
    EmptyOrigin(String),

    #[error("route {0:?}: path_prefix {1:?} must start with '/'")]
    UnrootedPrefix(String, String),

    #[error("route {0:?} sets strip_prefix without a path_prefix")]
    StripWithoutPrefix(String),

    #[error("duplicate route name {0:?}")]
    DuplicateRouteName(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a parsed config for semantic problems. Returns every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen_names = Vec::new();
    for route in &config.routes {
        if route.origin.trim().is_empty() {
            errors.push(ValidationError::EmptyOrigin(route.name.clone()));
        }
        if let Some(prefix) = &route.path_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::UnrootedPrefix(
                    route.name.clone(),
                    prefix.clone(),
                ));
            }
        }
        if route.strip_prefix && route.path_prefix.is_none() {
            errors.push(ValidationError::StripWithoutPrefix(route.name.clone()));
        }
        if seen_names.contains(&route.name) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        } else {
            seen_names.push(route.name.clone());
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
