//! Storage key allocation

use std::path::Path;

use uuid::Uuid;

/// Extension used when the filename carries none
pub const DEFAULT_EXTENSION: &str = "bin";

/// Allocates a fresh storage key for one upload attempt.
///
/// The key is namespaced under the owning user (`{user_id}/...`) so
/// ownership checks reduce to a prefix match, and derives nothing from
/// the filename except its final dot-suffix. Callers must allocate a new
/// key per attempt; keys are never reused across retries.
#[must_use]
pub fn allocate_key(user_id: i64, filename: &str) -> String {
    let extension = extract_extension(filename);
    let token = Uuid::new_v4().simple();
    format!("{user_id}/{token}.{extension}")
}

/// Lower-cased final dot-suffix of the filename, restricted to ASCII
/// alphanumerics. Anything else (no suffix, empty or non-ASCII suffix)
/// falls back to [`DEFAULT_EXTENSION`].
fn extract_extension(filename: &str) -> String {
    let sanitized = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .unwrap_or_default();

    if sanitized.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        sanitized
    }
}
