//! Header curation for the outbound leg and filtering on the way back.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Fixed User-Agent sent on every outbound call.
pub const RELAY_USER_AGENT: &str =
    concat!("API-Tester-Pro-CORS-Proxy/", env!("CARGO_PKG_VERSION"));

/// Caller headers never forwarded upstream.
pub const DENIED_REQUEST_HEADERS: &[&str] = &["host", "origin", "referer", "user-agent"];

/// Headers that describe the inbound leg only.
pub const INBOUND_TRANSPORT_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "upgrade",
    "content-length",
];

/// Upstream response headers dropped before returning to the caller.
pub const HOP_BY_HOP_RESPONSE_HEADERS: &[&str] =
    &["content-encoding", "transfer-encoding", "connection"];

/// Added when the caller did not supply them.
const DEFAULT_REQUEST_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-encoding", "gzip, deflate, br"),
    ("cache-control", "no-cache"),
    ("accept-language", "en-US,en;q=0.9"),
];

fn is_stripped(name: &str) -> bool {
    DENIED_REQUEST_HEADERS.contains(&name) || INBOUND_TRANSPORT_HEADERS.contains(&name)
}

/// Build the outbound header set from caller headers.
///
/// Names are matched case-insensitively. Entries that are not valid HTTP
/// header names or values are skipped.
pub fn build_outbound_headers(caller: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(caller.len() + DEFAULT_REQUEST_HEADERS.len() + 1);

    for (name, value) in caller {
        let lower = name.trim().to_ascii_lowercase();
        if is_stripped(&lower) {
            continue;
        }
        let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(lower.as_bytes()), HeaderValue::from_str(value.trim()))
        else {
            tracing::debug!("Skipping unrepresentable header '{}'", lower);
            continue;
        };
        headers.append(name, value);
    }

    headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(RELAY_USER_AGENT));
    for &(name, value) in DEFAULT_REQUEST_HEADERS {
        if !headers.contains_key(name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    headers
}

/// Flatten upstream headers into a map, minus hop-by-hop entries.
/// Repeated headers are joined with `", "`; non-UTF-8 values are decoded lossily.
pub fn filter_response_headers(upstream: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in upstream {
        let key = name.as_str();
        if HOP_BY_HOP_RESPONSE_HEADERS.contains(&key) {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes());
        match out.get_mut(key) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            },
            None => {
                out.insert(key.to_string(), value.into_owned());
            },
        }
    }
    out
}

/// Convert an inbound `HeaderMap` into ordered name/value pairs.
pub fn headers_to_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Case-insensitive lookup of the declared content type.
pub fn declared_content_type(headers: &[(String, String)]) -> Option<String> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_denied_headers_never_forwarded() {
        let headers = build_outbound_headers(&pairs(&[
            ("Host", "relay.local"),
            ("Origin", "http://localhost:8080"),
            ("Referer", "http://localhost:8080/app"),
            ("User-Agent", "Mozilla/5.0"),
            ("Connection", "keep-alive"),
            ("Content-Length", "42"),
            ("Authorization", "Bearer abc"),
        ]));

        assert!(headers.get("host").is_none());
        assert!(headers.get("origin").is_none());
        assert!(headers.get("referer").is_none());
        assert!(headers.get("connection").is_none());
        assert!(headers.get("content-length").is_none());
        assert_eq!(headers.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer abc"));
        assert_eq!(
            headers.get("user-agent").and_then(|v| v.to_str().ok()),
            Some(RELAY_USER_AGENT)
        );
    }

    #[test]
    fn test_defaults_do_not_override_caller() {
        let headers = build_outbound_headers(&pairs(&[("Accept", "application/xml")]));
        assert_eq!(headers.get("accept").and_then(|v| v.to_str().ok()), Some("application/xml"));
        assert_eq!(headers.get("cache-control").and_then(|v| v.to_str().ok()), Some("no-cache"));
        assert_eq!(
            headers.get("accept-language").and_then(|v| v.to_str().ok()),
            Some("en-US,en;q=0.9")
        );
    }

    #[test]
    fn test_invalid_header_skipped() {
        let headers = build_outbound_headers(&pairs(&[("bad header", "x"), ("X-Ok", "1")]));
        assert_eq!(headers.get("x-ok").and_then(|v| v.to_str().ok()), Some("1"));
    }

    #[test]
    fn test_response_filter_joins_repeats() {
        let mut upstream = HeaderMap::new();
        upstream.append("set-cookie", HeaderValue::from_static("a=1"));
        upstream.append("set-cookie", HeaderValue::from_static("b=2"));
        upstream.insert("content-encoding", HeaderValue::from_static("gzip"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("content-type", HeaderValue::from_static("application/json"));

        let filtered = filter_response_headers(&upstream);
        assert_eq!(filtered.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert!(!filtered.contains_key("content-encoding"));
        assert!(!filtered.contains_key("transfer-encoding"));
        assert_eq!(filtered.get("content-type").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_declared_content_type_case_insensitive() {
        let headers = pairs(&[("CONTENT-TYPE", " application/json ")]);
        assert_eq!(declared_content_type(&headers).as_deref(), Some("application/json"));
        assert!(declared_content_type(&pairs(&[("content-type", "")])).is_none());
    }
}
