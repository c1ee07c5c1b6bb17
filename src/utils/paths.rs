//! Relative path helpers.
//!
//! Plans and reports store paths relative to the template root with `/`
//! separators so they read the same on every platform.

use std::path::{Path, PathBuf};

/// Render `path` relative to `root` with forward slashes.
pub fn to_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a forward-slash relative path onto `root`.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Split a relative path into its parent (possibly empty) and final segment.
pub fn split_last(relative: &str) -> (&str, &str) {
    match relative.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", relative),
    }
}

/// Join a parent (possibly empty) and a final segment.
pub fn with_last(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Number of segments in a relative path.
pub fn depth(relative: &str) -> usize {
    relative.split('/').filter(|s| !s.is_empty()).count()
}
