//! HTTP cache control module
//!
//! `ETag` generation from file metadata and `If-None-Match` matching.

use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Cache-Control value for stored files
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Strong `ETag` built from file size and modification time
pub fn etag_from_metadata(meta: &Metadata) -> String {
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    format_etag(meta.len(), mtime)
}

fn format_etag(len: u64, mtime_nanos: u128) -> String {
    format!("\"{len:x}-{mtime_nanos:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list, and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_etag() {
        assert_eq!(format_etag(255, 16), "\"ff-10\"");
    }

    #[test]
    fn test_etag_from_metadata_changes_with_size() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"short").unwrap();
        std::fs::write(&b, b"much longer content").unwrap();

        let etag_a = etag_from_metadata(&std::fs::metadata(&a).unwrap());
        let etag_b = etag_from_metadata(&std::fs::metadata(&b).unwrap());
        assert!(etag_a.starts_with('"') && etag_a.ends_with('"'));
        assert_ne!(etag_a, etag_b);
        assert_eq!(etag_a, etag_from_metadata(&std::fs::metadata(&a).unwrap()));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }
}
