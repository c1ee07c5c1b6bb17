//! Directory traversal with path-prefix filtering.
//!
//! Skip rules are applied to names while walking, so excluded directories
//! and binary files are never opened.

use std::fs;
use std::path::Path;

use crate::defaults::RenameConfig;
use crate::utils::paths;

/// Name-based exclusion rules taken from the rename config.
#[derive(Debug, Clone, Copy)]
pub struct PathFilter<'a> {
    skip_dirs: &'a [String],
    root_only_skip_dirs: &'a [String],
    binary_extensions: &'a [String],
}

impl<'a> PathFilter<'a> {
    pub fn from_config(config: &'a RenameConfig) -> Self {
        Self {
            skip_dirs: &config.skip_dirs,
            root_only_skip_dirs: &config.root_only_skip_dirs,
            binary_extensions: &config.binary_extensions,
        }
    }

    /// Skip VCS/build-output dirs at any depth, and root-only dirs directly under the root.
    pub fn skips_dir(&self, name: &str, at_root: bool) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
            || (at_root && self.root_only_skip_dirs.iter().any(|d| d == name))
    }

    pub fn is_binary(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.binary_extensions
            .iter()
            .any(|b| b.eq_ignore_ascii_case(ext))
    }
}

/// A directory or file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to root, forward slashes.
    pub path: String,
    pub is_dir: bool,
}

/// Walk `root`, returning every non-excluded directory and file in sorted order.
///
/// Symlinks are not followed and not returned.
pub fn walk(root: &Path, filter: &PathFilter) -> Vec<Entry> {
    let mut entries = Vec::new();
    walk_recursive(root, root, filter, &mut entries);
    entries
}

fn walk_recursive(dir: &Path, root: &Path, filter: &PathFilter, entries: &mut Vec<Entry>) {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot read directory, skipping");
            return;
        }
    };

    let mut children: Vec<_> = read.flatten().collect();
    children.sort_by_key(|c| c.file_name());

    let at_root = dir == root;

    for child in children {
        let Ok(file_type) = child.file_type() else {
            continue;
        };
        let name = child.file_name().to_string_lossy().to_string();
        let path = child.path();

        if file_type.is_dir() {
            if filter.skips_dir(&name, at_root) {
                tracing::debug!(dir = %path.display(), "skipping excluded directory");
                continue;
            }
            entries.push(Entry {
                path: paths::to_relative(root, &path),
                is_dir: true,
            });
            walk_recursive(&path, root, filter, entries);
        } else if file_type.is_file() {
            if filter.is_binary(&name) {
                continue;
            }
            entries.push(Entry {
                path: paths::to_relative(root, &path),
                is_dir: false,
            });
        }
    }
}
