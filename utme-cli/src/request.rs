//! Beacon request helpers
//!
//! Query string encoding and the request metadata cleanup applied before
//! values become beacon parameters.

use md5::{Digest, Md5};
use std::collections::BTreeMap;

/// Render parameters as a form-encoded query string, sorted by key
///
/// Space becomes `+` and reserved characters are percent-encoded.
pub fn to_query(params: &BTreeMap<String, String>) -> Result<String, serde_urlencoded::ser::Error> {
    serde_urlencoded::to_string(params)
}

/// Replace the last octet of an IPv4 address with `0`
///
/// `124.45.3.123` becomes `124.45.3.0`. Anything that does not look like a
/// dotted quad is returned unchanged; an empty input stays empty.
pub fn anonymize_ip(addr: &str) -> String {
    let addr = addr.trim();
    match addr.rsplit_once('.') {
        Some((prefix, _)) if prefix.matches('.').count() == 2 => format!("{}.0", prefix),
        _ => addr.to_string(),
    }
}

/// Visitor id: MD5 hex digest of the user agent followed by a random number
pub fn visitor_id(user_agent: &str, salt: u32) -> String {
    let digest = Md5::digest(format!("{}{}", user_agent, salt).as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(pairs: &[(&str, &str)]) -> String {
        let params: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        to_query(&params).unwrap()
    }

    #[test]
    fn test_query_encoding() {
        assert_eq!(query_of(&[("utmp", "a b")]), "utmp=a+b");
        assert_eq!(query_of(&[("utme", "5(c*a)")]), "utme=5%28c*a%29");
        assert_eq!(query_of(&[("utmcc", "__utma=1;")]), "utmcc=__utma%3D1%3B");
        assert_eq!(query_of(&[("utmr", "ü")]), "utmr=%C3%BC");
    }

    #[test]
    fn test_query_is_sorted() {
        assert_eq!(
            query_of(&[("utmn", "2"), ("utmac", "UA-1"), ("utme", "")]),
            "utmac=UA-1&utme=&utmn=2"
        );
    }

    #[test]
    fn test_anonymize_ip() {
        assert_eq!(anonymize_ip("124.45.3.123"), "124.45.3.0");
        assert_eq!(anonymize_ip(""), "");
        assert_eq!(anonymize_ip("::1"), "::1");
        assert_eq!(anonymize_ip("localhost"), "localhost");
    }

    #[test]
    fn test_visitor_id() {
        // empty agent with salt 0 hashes the string "0"
        assert_eq!(visitor_id("", 0), "cfcd208495d565ef66e7dff9f98764da");

        let id = visitor_id("Mozilla/5.0", 42);
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, visitor_id("Mozilla/5.0", 42));
        assert_ne!(id, visitor_id("Mozilla/5.0", 43));
    }
}
