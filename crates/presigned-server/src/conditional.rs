//! Cache validators: ETag computation and conditional-request evaluation.

use chrono::DateTime;
use http::HeaderMap;
use http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use md5::{Digest, Md5};

/// Compute the ETag for an object.
///
/// This is a weak validator hashed over `"{path}-{size}-{last_modified}"`,
/// not a content hash: it identifies a resource version without reading
/// the file, at the cost of false cache-negatives under coarse mtime
/// resolution. Returned unquoted; the pipeline adds the surrounding
/// quotes when emitting the header.
#[must_use]
pub fn compute_etag(path: &str, size: u64, last_modified: i64) -> String {
    let digest = Md5::digest(format!("{path}-{size}-{last_modified}"));
    hex::encode(digest)
}

/// Evaluate the request's cache validators against the object's.
///
/// An `If-None-Match` value (trimmed of surrounding quotes) equal to the
/// ETag is not-modified. A mismatched or absent `If-None-Match` falls
/// through to `If-Modified-Since`, parsed as an HTTP date; the object is
/// not-modified when its timestamp is at or before the header's.
#[must_use]
pub fn is_not_modified(headers: &HeaderMap, etag: &str, last_modified: i64) -> bool {
    if let Some(if_none_match) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) {
        if if_none_match.trim_matches('"') == etag {
            return true;
        }
    }

    if let Some(if_modified_since) = headers.get(IF_MODIFIED_SINCE).and_then(|v| v.to_str().ok())
    {
        if let Ok(since) = DateTime::parse_from_rfc2822(if_modified_since) {
            return last_modified <= since.timestamp();
        }
    }

    false
}
