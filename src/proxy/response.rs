//! Response rewriting for the client-facing side.
//!
//! # Responsibilities
//! - Copy origin response headers minus hop-by-hop and internal keys
//! - Fall back to a default Content-Type when the origin sends none
//! - Mask redirect Locations behind the externally visible host
//! - Expire the `messages` flash cookie when the origin clears it
//!
//! # Design Decisions
//! - Status and body pass through verbatim; no buffering beyond the one
//!   already done by the upstream client
//! - Rewritten Locations always carry the inbound request's scheme
//! - Only absolute Locations are rewritten; relative ones pass through

use url::Url;

use crate::proxy::cookies::MESSAGES_COOKIE;
use crate::proxy::headers::{is_hop_by_hop, HeaderBag};
use crate::proxy::target::OriginTarget;
use crate::proxy::OriginResponse;

/// Response header keys never copied to the client. `status` and
/// `content-location` are bookkeeping from the upstream collaborator, the
/// rest is the hop-by-hop set.
const IGNORED_RESPONSE_KEYS: &[&str] = &["status", "content-location"];

/// Response handed back to the hosting layer for serialization.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: HeaderBag,
    pub body: axum::body::Bytes,
    /// Cookie names the client must be told to delete. The hosting adapter
    /// emits an expiring Set-Cookie per name, independent of whatever
    /// Set-Cookie was forwarded from the origin.
    pub expired_cookies: Vec<String>,
}

/// Build the client-facing response from the origin's.
///
/// `sent_headers` is the header set that was actually forwarded to the
/// origin; the `messages` expiry check depends on what the origin saw, not on
/// the raw inbound request.
pub fn build_outbound_response(
    sent_headers: &HeaderBag,
    origin_response: &OriginResponse,
    client_host: &str,
    origin: &OriginTarget,
    method: &str,
    is_secure: bool,
    default_content_type: &str,
) -> ProxyResponse {
    let mut headers = HeaderBag::new();

    let content_type = origin_response
        .headers
        .get("Content-Type")
        .unwrap_or(default_content_type);
    headers.insert("Content-Type", content_type);

    for (name, value) in origin_response.headers.iter() {
        if is_hop_by_hop(name) {
            continue;
        }
        if IGNORED_RESPONSE_KEYS
            .iter()
            .any(|k| name.eq_ignore_ascii_case(k))
        {
            continue;
        }
        headers.insert(name, value);
    }

    if matches!(origin_response.status, 301 | 302) {
        if let Some(location) = headers.get("Location") {
            if let Some(rewritten) = rewrite_location(location, client_host, origin, is_secure) {
                headers.insert("Location", rewritten);
            }
        }
    }

    let mut expired_cookies = Vec::new();
    if should_expire_messages(sent_headers, origin_response, method) {
        expired_cookies.push(MESSAGES_COOKIE.to_string());
    }

    ProxyResponse {
        status: origin_response.status,
        headers,
        body: origin_response.body.clone(),
        expired_cookies,
    }
}

/// Point a redirect back through the proxy.
///
/// Replaces the Location's netloc with the externally visible host and
/// reinserts the routed prefix so the client never sees the origin directly.
/// Returns `None` when the Location is not an absolute URL.
fn rewrite_location(
    location: &str,
    client_host: &str,
    origin: &OriginTarget,
    is_secure: bool,
) -> Option<String> {
    let parsed = Url::parse(location).ok()?;
    if !parsed.has_host() {
        return None;
    }
    let scheme = if is_secure { "https" } else { "http" };
    let path = match &origin.path_prefix {
        Some(prefix) => format!("{}{}", prefix, parsed.path()),
        None => parsed.path().to_string(),
    };
    let query = parsed
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();
    Some(format!("{}://{}{}{}", scheme, client_host, path, query))
}

/// The origin clears the flash cookie by omitting it from Set-Cookie or
/// assigning it empty. Only a GET that actually forwarded a `messages=`
/// cookie qualifies; mutations must never trigger the expiry.
fn should_expire_messages(
    sent_headers: &HeaderBag,
    origin_response: &OriginResponse,
    method: &str,
) -> bool {
    if method != "GET" {
        return false;
    }
    let sent_messages = sent_headers
        .get("Cookie")
        .map(|cookie| cookie.contains("messages="))
        .unwrap_or(false);
    if !sent_messages {
        return false;
    }
    let set_cookie = origin_response.headers.get("Set-Cookie").unwrap_or("");
    !set_cookie.contains("messages=") || set_cookie.contains("messages=;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::headers::HeaderBag;

    fn origin_response(status: u16, headers: Vec<(&str, &str)>) -> OriginResponse {
        let mut bag = HeaderBag::new();
        for (name, value) in headers {
            bag.insert(name, value);
        }
        OriginResponse {
            status,
            headers: bag,
            body: axum::body::Bytes::from_static(b"OK"),
        }
    }

    fn bare_origin() -> OriginTarget {
        OriginTarget::parse("internal-host", None)
    }

    fn sent(pairs: Vec<(&str, &str)>) -> HeaderBag {
        let mut bag = HeaderBag::new();
        for (name, value) in pairs {
            bag.insert(name, value);
        }
        bag
    }

    fn rewrite(
        sent_headers: &HeaderBag,
        response: &OriginResponse,
        origin: &OriginTarget,
        method: &str,
    ) -> ProxyResponse {
        build_outbound_response(
            sent_headers,
            response,
            "testserver",
            origin,
            method,
            false,
            "text/html",
        )
    }

    #[test]
    fn test_status_and_body_pass_through() {
        let response = origin_response(200, vec![("Content-Type", "text/plain")]);
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert_eq!(out.status, 200);
        assert_eq!(&out.body[..], b"OK");
        assert_eq!(out.headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_missing_content_type_falls_back_to_default() {
        let response = origin_response(200, vec![]);
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert_eq!(out.headers.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_hop_by_hop_and_internal_keys_are_dropped() {
        let response = origin_response(
            200,
            vec![
                ("connection", "close"),
                ("keep-alive", "timeout=5"),
                ("status", "200"),
                ("content-location", "/real"),
                ("set-cookie", "sessionid=123"),
                ("content-type", "text/html"),
            ],
        );
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert!(!out.headers.contains("Connection"));
        assert!(!out.headers.contains("Keep-Alive"));
        assert!(!out.headers.contains("Status"));
        assert!(!out.headers.contains("Content-Location"));
        assert_eq!(out.headers.get("Set-Cookie"), Some("sessionid=123"));
        assert_eq!(out.headers.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_redirect_location_is_masked() {
        let response = origin_response(
            302,
            vec![("Location", "http://internal-host/login/?next=/")],
        );
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert_eq!(
            out.headers.get("Location"),
            Some("http://testserver/login/?next=/")
        );
    }

    #[test]
    fn test_redirect_uses_inbound_scheme() {
        let response = origin_response(301, vec![("Location", "http://internal-host/next")]);
        let out = build_outbound_response(
            &sent(vec![]),
            &response,
            "testserver",
            &bare_origin(),
            "GET",
            true,
            "text/html",
        );
        assert_eq!(out.headers.get("Location"), Some("https://testserver/next"));
    }

    #[test]
    fn test_redirect_reinserts_routed_prefix() {
        let origin = OriginTarget::parse("internal-host", Some("/app".to_string()));
        let response = origin_response(302, vec![("Location", "http://internal-host/login/")]);
        let out = rewrite(&sent(vec![]), &response, &origin, "GET");
        assert_eq!(
            out.headers.get("Location"),
            Some("http://testserver/app/login/")
        );
    }

    #[test]
    fn test_prefix_strip_then_reinsert_is_identity() {
        let origin = OriginTarget::parse("internal-host", Some("/app".to_string()));
        let external_path = "/app/account/";
        let target = origin.resolve(external_path, false);
        assert_eq!(target, "http://internal-host/account/");

        // The origin redirects to the path it saw; masking restores the
        // externally visible one.
        let response = origin_response(302, vec![("Location", &target)]);
        let out = rewrite(&sent(vec![]), &response, &origin, "GET");
        assert_eq!(
            out.headers.get("Location"),
            Some("http://testserver/app/account/")
        );
    }

    #[test]
    fn test_relative_location_passes_through() {
        let response = origin_response(302, vec![("Location", "/login/?next=/")]);
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert_eq!(out.headers.get("Location"), Some("/login/?next=/"));
    }

    #[test]
    fn test_non_redirect_location_is_left_alone() {
        let response = origin_response(200, vec![("Location", "http://internal-host/x")]);
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert_eq!(out.headers.get("Location"), Some("http://internal-host/x"));
    }

    #[test]
    fn test_messages_expired_when_origin_omits_it() {
        let sent_headers = sent(vec![("Cookie", "sessionid=abc;messages=\"hi\"")]);
        let response = origin_response(200, vec![("Set-Cookie", "sessionid=abc; Path=/")]);
        let out = rewrite(&sent_headers, &response, &bare_origin(), "GET");
        assert_eq!(out.expired_cookies, vec!["messages".to_string()]);
    }

    #[test]
    fn test_messages_expired_when_origin_clears_it() {
        let sent_headers = sent(vec![("Cookie", "messages=\"hi\"")]);
        let response = origin_response(200, vec![("Set-Cookie", "messages=; Max-Age=0")]);
        let out = rewrite(&sent_headers, &response, &bare_origin(), "GET");
        assert_eq!(out.expired_cookies, vec!["messages".to_string()]);
    }

    #[test]
    fn test_messages_kept_when_origin_reassigns_it() {
        let sent_headers = sent(vec![("Cookie", "messages=\"hi\"")]);
        let response = origin_response(200, vec![("Set-Cookie", "messages=\"bye\"; Path=/")]);
        let out = rewrite(&sent_headers, &response, &bare_origin(), "GET");
        assert!(out.expired_cookies.is_empty());
    }

    #[test]
    fn test_messages_never_expired_without_sent_cookie() {
        let response = origin_response(200, vec![]);
        let out = rewrite(&sent(vec![]), &response, &bare_origin(), "GET");
        assert!(out.expired_cookies.is_empty());
    }

    #[test]
    fn test_messages_never_expired_on_post() {
        let sent_headers = sent(vec![("Cookie", "messages=\"hi\"")]);
        let response = origin_response(200, vec![("Set-Cookie", "messages=; Max-Age=0")]);
        let out = rewrite(&sent_headers, &response, &bare_origin(), "POST");
        assert!(out.expired_cookies.is_empty());
    }
}
