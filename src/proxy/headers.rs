//! Header translation for outbound origin requests.
//!
//! # Responsibilities
//! - Canonicalize header names from transport-specific encodings
//! - Strip hop-by-hop headers (RFC 2616 §13.5.1)
//! - Overwrite Host with the origin netloc
//! - Synthesize the outbound Cookie header and identity header
//!
//! # Design Decisions
//! - Header names compare case-insensitively; display form is Title-Case
//! - Case collisions de-duplicate last-write-wins (normalization, not error)
//! - An empty Content-Length is dropped rather than forwarded

use crate::proxy::cookies::clone_cookies;
use crate::proxy::target::OriginTarget;
use crate::proxy::InboundRequest;

/// Headers meaningful only for a single transport connection. A proxy must
/// not forward these in either direction.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Header carrying the authenticated username to the origin.
pub const FORWARDED_USER_HEADER: &str = "X-Forwarded-User";

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

/// Canonicalize a header name to `Title-Case-With-Hyphens`.
///
/// Accepts real header names in any casing (`x-foo`, `X-FOO`) as well as the
/// CGI-style transport encoding (`HTTP_X_FOO`). The mapping is: drop one
/// leading `HTTP_` tag, treat `_` as `-`, then title-case each hyphen
/// segment.
pub fn canonical_header_name(raw: &str) -> String {
    let name = raw.strip_prefix("HTTP_").unwrap_or(raw);
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split(['_', '-']).enumerate() {
        if i > 0 {
            out.push('-');
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            for c in chars {
                out.push(c.to_ascii_lowercase());
            }
        }
    }
    out
}

/// Ordered header map with canonical display names.
///
/// Inserts are case-insensitive and last-write-wins: a later insert for an
/// existing name replaces the value in place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<(String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, canonicalizing the name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let canonical = canonical_header_name(name);
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&canonical))
        {
            Some((_, existing_value)) => *existing_value = value,
            None => self.entries.push((canonical, value)),
        }
    }

    /// Fold a repeated header into a single comma-joined value.
    pub fn append_joined(&mut self, name: &str, value: &str) {
        match self.get(name) {
            Some(existing) => {
                let joined = format!("{}, {}", existing, value);
                self.insert(name, joined);
            }
            None => self.insert(name, value),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the header set forwarded to the origin.
///
/// Copies every inbound header that is not hop-by-hop, overwrites Host with
/// the origin netloc, synthesizes Cookie from the parsed jar, and injects the
/// identity header when an authenticated username is known.
pub fn build_outbound_headers(request: &InboundRequest, origin: &OriginTarget) -> HeaderBag {
    let mut headers = HeaderBag::new();

    for (name, value) in &request.headers {
        let canonical = canonical_header_name(name);
        if is_hop_by_hop(&canonical) {
            continue;
        }
        // An empty Content-Length on a body-less request makes many origin
        // servers reject the whole message.
        if canonical == "Content-Length" && value.trim().is_empty() {
            continue;
        }
        // Host is overwritten below; Cookie is synthesized from the jar so
        // the wire form is canonical even after framework parsing.
        if canonical == "Host" || canonical == "Cookie" {
            continue;
        }
        headers.insert(&canonical, value.as_str());
    }

    headers.insert("Host", origin.host_and_port.as_str());

    if !request.cookies.is_empty() {
        headers.insert("Cookie", clone_cookies(&request.cookies));
    }

    if let Some(username) = &request.authenticated_username {
        headers.insert(FORWARDED_USER_HEADER, username.as_str());
    }

    headers
}
