//! Read-phase rename plan.
//!
//! The whole plan is computed before anything on disk changes. Paths in the
//! plan describe the tree as it was read; the `RenameLedger` maps them onto
//! the tree as it is after each applied rename.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::content::classify;
use super::paths::plan_renames;
use super::walk::{walk, PathFilter};
use crate::defaults::RenameConfig;

/// Rewrite category of a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Source,
    ProjectManifest,
    SolutionManifest,
    Documentation,
    EditorConfig,
    BuildConfig,
}

/// A file selected for content rewriting.
#[derive(Debug, Clone, Serialize)]
pub struct FileTarget {
    /// Path relative to root as read in the plan phase.
    pub path: String,
    pub category: FileCategory,
}

/// A directory or file rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRename {
    /// Original path relative to root.
    pub from: String,
    /// New path relative to root.
    pub to: String,
    pub is_dir: bool,
}

/// Every mutation of a run, in application order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenamePlan {
    pub directories: Vec<PathRename>,
    pub files: Vec<PathRename>,
    /// Solution manifests are renamed after their content is rewritten.
    pub solution_files: Vec<PathRename>,
    pub targets: Vec<FileTarget>,
}

impl RenamePlan {
    /// Build the plan from a single read-only walk of `root`.
    pub fn build(root: &Path, old_token: &str, new_token: &str, config: &RenameConfig) -> Self {
        let filter = PathFilter::from_config(config);
        let entries = walk(root, &filter);

        let targets: Vec<FileTarget> = entries
            .iter()
            .filter(|e| !e.is_dir)
            .filter_map(|e| {
                classify(&e.path, &config.categories).map(|category| FileTarget {
                    path: e.path.clone(),
                    category,
                })
            })
            .collect();

        let mut plan = RenamePlan {
            targets,
            ..Default::default()
        };

        for rename in plan_renames(&entries, old_token, new_token) {
            if rename.is_dir {
                plan.directories.push(rename);
            } else if plan.is_solution(&rename.from) {
                plan.solution_files.push(rename);
            } else {
                plan.files.push(rename);
            }
        }

        plan
    }

    fn is_solution(&self, path: &str) -> bool {
        self.targets
            .iter()
            .any(|t| t.path == path && t.category == FileCategory::SolutionManifest)
    }

    /// Targets belonging to any of `categories`, in walk order.
    pub fn targets_in<'a>(
        &'a self,
        categories: &'a [FileCategory],
    ) -> impl Iterator<Item = &'a FileTarget> + 'a {
        self.targets
            .iter()
            .filter(move |t| categories.contains(&t.category))
    }

    pub fn rename_count(&self) -> usize {
        self.directories.len() + self.files.len() + self.solution_files.len()
    }
}

/// Renames applied so far, used to re-resolve paths recorded in the plan.
#[derive(Debug, Clone, Default)]
pub struct RenameLedger {
    applied: Vec<(String, String)>,
}

impl RenameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rename of `from` to `to`, both as they were at the time of the rename.
    pub fn record(&mut self, from: &str, to: &str) {
        self.applied.push((from.to_string(), to.to_string()));
    }

    /// Map a plan-phase path to where it lives now.
    pub fn resolve(&self, original: &str) -> String {
        let mut current = original.to_string();
        for (from, to) in &self.applied {
            if current == *from {
                current = to.clone();
            } else if let Some(rest) = current.strip_prefix(from.as_str()) {
                if rest.starts_with('/') {
                    current = format!("{}{}", to, rest);
                }
            }
        }
        current
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}
