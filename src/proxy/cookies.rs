//! Cookie jar parsing and outbound Cookie synthesis.
//!
//! # Responsibilities
//! - Parse the inbound Cookie header into an ordered jar
//! - Rebuild the single outbound Cookie header value
//! - Quote the `messages` flash cookie so embedded quotes survive transit
//!
//! # Design Decisions
//! - Join order is jar insertion order (appearance order in the header)
//! - Pairs split on `;` only; commas inside values survive untouched
//! - Pairs without `=` are dropped, not an error

/// Flash-message cookie whose value is a quoted multi-segment payload.
pub const MESSAGES_COOKIE: &str = "messages";

/// Parse a raw `Cookie` header value into ordered `(name, value)` pairs.
///
/// A value wrapped in one double-quote pair is unquoted and `\"` unescaped,
/// so the jar always holds the literal value.
pub fn parse_cookie_header(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), unquote(value.trim())))
        })
        .collect()
}

/// Rebuild the outbound `Cookie` header value from the jar.
///
/// Pairs are joined with `;` (no space) in jar order. The `messages` cookie
/// is re-emitted wrapped in double quotes with embedded quotes escaped as
/// `\"`; a bare join would corrupt its delimiter scan downstream.
pub fn clone_cookies(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| {
            if name == MESSAGES_COOKIE {
                format!("{}=\"{}\"", name, value.replace('"', "\\\""))
            } else {
                format!("{}={}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}
