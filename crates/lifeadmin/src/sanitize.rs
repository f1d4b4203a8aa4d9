//! Helpers for keeping sensitive data out of logs and span attributes.
//!
//! Upload paths reveal the user's directory layout and provider error bodies
//! sometimes echo request parameters (including API keys), so both are
//! reduced before they are logged or stored on the pipeline state.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Maximum length for provider error bodies kept in error messages.
pub const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Truncates a response body to [`MAX_ERROR_BODY_LENGTH`] characters.
pub fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
        None => body.to_string(),
    }
}

/// Returns a short deterministic hash of a path for correlation without
/// exposing the actual path.
pub fn hash_path(path: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
