//! Strategy name checks
//!
//! The strategy name ends up in generated file and directory names, so it
//! must be checked with [`is_filesystem_safe_name`] before any path is built
//! from it.

/// Returns true if `value` can be used to derive an output path.
///
/// Allowed characters are ASCII letters, digits, `_`, `-` and space. Names
/// that are empty after trimming, or that contain `..`, `/` or `\`, are
/// rejected.
pub fn is_filesystem_safe_name(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    if value.contains("..") || value.contains('/') || value.contains('\\') {
        return false;
    }

    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
}
