//! Header snapshot taken at ingestion time

use axum::http::header::HOST;
use axum::http::HeaderMap;
use contracts::HeaderSnapshot;

/// Copy the inbound headers into an owned snapshot.
///
/// `Host` is left out: it names the request target, not the event.
/// Names are canonicalised (`x-test` → `X-Test`), repeated headers keep
/// their arrival order, non-UTF-8 values are converted lossily.
pub fn snapshot_headers(headers: &HeaderMap) -> HeaderSnapshot {
    let mut snapshot = HeaderSnapshot::new();
    for (name, value) in headers.iter().filter(|(name, _)| **name != HOST) {
        snapshot
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    snapshot
}

/// Canonical MIME header form: first letter and every letter after '-' upper-cased
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_header_name("x-test"), "X-Test");
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("x-marathon-event-id"), "X-Marathon-Event-Id");
        assert_eq!(canonical_header_name("host"), "Host");
    }

    #[test]
    fn test_snapshot_keeps_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("x-test", HeaderValue::from_static("1"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let snapshot = snapshot_headers(&headers);
        assert_eq!(snapshot.get("X-Test"), Some(&vec!["1".to_string()]));
        assert_eq!(
            snapshot.get("Accept"),
            Some(&vec!["text/plain".to_string(), "application/json".to_string()])
        );
    }

    #[test]
    fn test_snapshot_skips_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("127.0.0.1:8080"));
        headers.insert("x-test", HeaderValue::from_static("1"));

        let snapshot = snapshot_headers(&headers);
        assert!(!snapshot.contains_key("Host"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_snapshot_lossy_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-raw", HeaderValue::from_bytes(&[b'a', 0xff, b'b']).unwrap());

        let snapshot = snapshot_headers(&headers);
        assert_eq!(snapshot["X-Raw"], vec!["a\u{fffd}b".to_string()]);
    }
}
