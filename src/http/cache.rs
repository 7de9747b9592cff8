//! HTTP cache control module
//!
//! `Cache-Control` policies, `ETag` generation and conditional request handling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// One year, the longest max-age caches are expected to honor
pub const ONE_YEAR: u32 = 31_536_000;

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Content-addressed asset, cached for `max-age` seconds without revalidation
    Immutable(u32),
    /// Always revalidate with the server before reuse
    NoCache,
}

impl CachePolicy {
    /// Long-lived policy applied to build and media assets
    pub const LONG_LIVED: Self = Self::Immutable(ONE_YEAR);

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Immutable(max_age) => format!("public, max-age={max_age}, immutable"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

/// Generate `ETag` from file metadata
///
/// Hashes the length and modification time, so validating a large build
/// file never reads its contents.
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let mut hasher = DefaultHasher::new();
    len.hash(&mut hasher);
    modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Derive the `ETag` of an encoded variant so it never collides with the identity body
pub fn variant_etag(etag: &str, encoding: &str) -> String {
    format!("\"{}-{encoding}\"", etag.trim_matches('"'))
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
///
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}
