//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route configs into origin targets
//! - Look up the matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Explicit None rather than silent default

use crate::config::RouteConfig;
use crate::proxy::OriginTarget;

/// A compiled route: match condition plus its origin.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    /// Path prefix this route matches. `None` matches every path.
    pub path_prefix: Option<String>,
    pub origin: OriginTarget,
}

impl Route {
    fn matches(&self, path: &str) -> bool {
        match &self.path_prefix {
            Some(prefix) => path.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Immutable routing table, one entry per configured prefix.
#[derive(Debug, Default)]
pub struct ProxyRouter {
    routes: Vec<Route>,
}

impl ProxyRouter {
    /// Compile the config into a frozen routing table.
    ///
    /// The origin's strip-prefix is populated from the route prefix only
    /// when `strip_prefix` is set; otherwise the full inbound path is
    /// forwarded unchanged.
    pub fn from_config(mut configs: Vec<RouteConfig>) -> Self {
        configs.sort_by(|a, b| b.priority.cmp(&a.priority));
        let routes = configs
            .into_iter()
            .map(|config| {
                let strip = if config.strip_prefix {
                    config.path_prefix.clone()
                } else {
                    None
                };
                Route {
                    name: config.name,
                    path_prefix: config.path_prefix,
                    origin: OriginTarget::parse(&config.origin, strip),
                }
            })
            .collect();
        Self { routes }
    }

    /// Find the first route matching `path`, highest priority first.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
