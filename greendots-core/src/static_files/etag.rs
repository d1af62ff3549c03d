use httpdate::parse_http_date;
use std::time::SystemTime;

/// Weak ETag from size and mtime: `W/"size-mtime"` in hex.
pub(crate) fn generate_etag(size: u64, modified: Option<SystemTime>) -> String {
    let mtime_secs = modified
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("W/\"{size:x}-{mtime_secs:x}\"")
}

/// Weak comparison against an `If-None-Match` list.
pub(crate) fn etag_matches(etag: &str, if_none_match: &str) -> bool {
    if if_none_match.trim() == "*" {
        return true;
    }

    let ours = etag.strip_prefix("W/").unwrap_or(etag);
    if_none_match.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate.strip_prefix("W/").unwrap_or(candidate) == ours
    })
}

/// Whether the file changed after the `If-Modified-Since` date. Unknown mtimes
/// and unparsable dates count as modified.
pub(crate) fn modified_since(file_modified: Option<SystemTime>, if_modified_since: &str) -> bool {
    let Some(file_time) = file_modified else {
        return true;
    };
    let Ok(since) = parse_http_date(if_modified_since) else {
        return true;
    };

    // HTTP dates have one-second resolution.
    match file_time.duration_since(since) {
        Ok(delta) => delta.as_secs() >= 1,
        Err(_) => false,
    }
}
