//! Directory and file renames.
//!
//! Only the final path segment is rewritten. Directories are applied
//! shallow-first and every applied rename goes into the ledger, so later
//! entries are looked up where they live now rather than where the plan
//! first saw them.

use serde::Serialize;
use std::fs;
use std::path::Path;

use super::plan::{PathRename, RenameLedger};
use super::walk::Entry;
use crate::defaults::FileErrorPolicy;
use crate::error::{Error, Result};
use crate::utils::paths;

/// A warning about a rename that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct RenameWarning {
    /// Warning category: `path_conflict` or `missing_source`.
    pub kind: String,
    pub file: String,
    pub message: String,
}

/// A per-file failure that did not stop the run.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameOutcome {
    /// Applied renames, with paths as they were at application time.
    pub renamed: Vec<PathRename>,
    pub warnings: Vec<RenameWarning>,
    pub failures: Vec<FileFailure>,
}

/// Plan renames for walked entries whose final segment contains `old_token`.
///
/// Directories come first (shallow before deep), then files, each in path order.
pub fn plan_renames(entries: &[Entry], old_token: &str, new_token: &str) -> Vec<PathRename> {
    if old_token.is_empty() {
        return Vec::new();
    }

    let mut renames: Vec<PathRename> = entries
        .iter()
        .filter_map(|entry| {
            let (parent, name) = paths::split_last(&entry.path);
            if !name.contains(old_token) {
                return None;
            }
            Some(PathRename {
                from: entry.path.clone(),
                to: paths::with_last(parent, &name.replace(old_token, new_token)),
                is_dir: entry.is_dir,
            })
        })
        .collect();

    renames.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| paths::depth(&a.from).cmp(&paths::depth(&b.from)))
            .then_with(|| a.from.cmp(&b.from))
    });

    renames
}

/// Apply planned renames in order, recording each one in `ledger`.
///
/// Existing targets and vanished sources are skipped with a warning. A failed
/// rename is recorded and the run continues unless `policy` is `Abort`.
pub fn apply_renames(
    root: &Path,
    renames: &[PathRename],
    ledger: &mut RenameLedger,
    policy: FileErrorPolicy,
) -> Result<RenameOutcome> {
    let mut outcome = RenameOutcome::default();

    for rename in renames {
        let current_from = ledger.resolve(&rename.from);
        let (parent, _) = paths::split_last(&current_from);
        let (_, new_name) = paths::split_last(&rename.to);
        let current_to = paths::with_last(parent, new_name);

        let from_path = paths::join_relative(root, &current_from);
        let to_path = paths::join_relative(root, &current_to);

        if !from_path.exists() {
            outcome.warnings.push(RenameWarning {
                kind: "missing_source".to_string(),
                file: current_from.clone(),
                message: format!("'{}' no longer exists, rename skipped", current_from),
            });
            continue;
        }

        if to_path.exists() {
            crate::log_status!("rename", "Skipping {}: '{}' already exists", current_from, current_to);
            outcome.warnings.push(RenameWarning {
                kind: "path_conflict".to_string(),
                file: current_to.clone(),
                message: format!(
                    "Rename target '{}' already exists (from '{}')",
                    current_to, current_from
                ),
            });
            continue;
        }

        match fs::rename(&from_path, &to_path) {
            Ok(()) => {
                tracing::debug!(from = %current_from, to = %current_to, "renamed");
                ledger.record(&current_from, &current_to);
                outcome.renamed.push(PathRename {
                    from: current_from,
                    to: current_to,
                    is_dir: rename.is_dir,
                });
            }
            Err(e) => {
                let context = format!("rename {} → {}", current_from, current_to);
                if policy == FileErrorPolicy::Abort {
                    return Err(Error::internal_io(e.to_string(), Some(context)));
                }
                tracing::warn!(error = %e, "{}", context);
                outcome.failures.push(FileFailure {
                    file: current_from,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}
