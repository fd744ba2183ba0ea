//! Path utilities for shell-like path expansion.

use std::path::{Path, PathBuf};

use crate::constants::FILE_URI_PREFIX;

/// Expands a leading tilde to the user's home directory.
///
/// Surrounding whitespace is trimmed and an empty input yields an empty path.
/// Relative paths are returned unchanged; see [`expand_and_resolve`].
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

/// Expands a path and resolves it against `base_dir` when it is relative.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

/// Turns a filename from a catalog document into a `file://` URI.
///
/// Values that already carry the prefix are left alone.
#[must_use]
pub fn file_uri(filename: &str) -> String {
    if filename.starts_with(FILE_URI_PREFIX) {
        filename.to_string()
    } else {
        format!("{FILE_URI_PREFIX}{filename}")
    }
}
