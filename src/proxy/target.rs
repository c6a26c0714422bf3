//! Origin target resolution.
//!
//! # Responsibilities
//! - Hold the per-route origin configuration (host, scheme, prefix)
//! - Build the target URL for an inbound path and query
//! - Strip a configured path prefix exactly once before forwarding
//!
//! # Design Decisions
//! - Resolution is pure string concatenation; malformed paths pass through
//! - Absent scheme inherits the inbound request's scheme
//! - Both `host:port` and `scheme://host:port` origin strings are accepted

/// One origin server behind the proxy.
///
/// Built once at startup from a route entry and shared read-only across
/// requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTarget {
    /// Network location of the origin, e.g. `backend.internal:8000`.
    pub host_and_port: String,

    /// Explicit scheme for outbound requests. `None` inherits the scheme of
    /// the inbound request.
    pub scheme: Option<String>,

    /// Leading path segment stripped before forwarding and reinserted when
    /// masking redirect locations.
    pub path_prefix: Option<String>,
}

impl OriginTarget {
    /// Parse an origin string from configuration.
    ///
    /// Accepts a bare netloc (`backend:8000`) or a full form with scheme
    /// (`https://backend:8000`). Anything after the first `/` of the netloc
    /// is dropped; origins are host-level, not path-level.
    pub fn parse(origin: &str, path_prefix: Option<String>) -> Self {
        let (scheme, rest) = match origin.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.to_string()), rest),
            None => (None, origin),
        };
        let host_and_port = rest.split('/').next().unwrap_or(rest).to_string();
        Self {
            host_and_port,
            scheme,
            path_prefix,
        }
    }

    /// Compute the target URL on the origin for an inbound `path_and_query`.
    ///
    /// The configured prefix is removed exactly once, and only from the
    /// start of the path. No URL validation happens here; the result is a
    /// straight concatenation.
    pub fn resolve(&self, path_and_query: &str, is_secure: bool) -> String {
        let path = match &self.path_prefix {
            Some(prefix) if path_and_query.starts_with(prefix.as_str()) => {
                &path_and_query[prefix.len()..]
            }
            _ => path_and_query,
        };
        let scheme = self.effective_scheme(is_secure);
        format!("{}://{}{}", scheme, self.host_and_port, path)
    }

    /// The scheme outbound requests will use.
    pub fn effective_scheme(&self, is_secure: bool) -> &str {
        match &self.scheme {
            Some(scheme) => scheme,
            None if is_secure => "https",
            None => "http",
        }
    }
}
