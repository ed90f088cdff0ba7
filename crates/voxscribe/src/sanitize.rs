//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Upload paths carry user and content identifiers, and provider error
//! bodies can echo request data back, so neither goes into logs verbatim.

use std::path::Path;

/// Maximum length of a provider error body kept for logs and job records.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Truncates a response body to a loggable length on a char boundary.
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
