//! HTTP cache validator module
//!
//! Provides `ETag`/`Last-Modified` generation and conditional request handling.

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// Format used by `Last-Modified` and `If-Modified-Since`
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate a quoted `ETag` from file content
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Format a modification time as an HTTP date
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE).to_string()
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a comma-separated list, weak validators and `*`.
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

/// Check whether the resource is unchanged since `If-Modified-Since`
///
/// Only consulted when the request carries no `If-None-Match`.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since
        .and_then(|h| DateTime::parse_from_rfc2822(h.trim()).ok())
    else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
