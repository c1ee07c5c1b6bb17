//! Template retargeting: plan and apply the placeholder rename.
//!
//! Walks the template once to build a `RenamePlan` (directory renames, file
//! renames, content targets by category), then applies it step by step.

mod content;
mod paths;
mod plan;
mod walk;

pub use content::{
    classify, replace_all, rewrite_file, rewrite_file_with, rewrite_pass, FileEdit, FileSkip,
    MatchMode, PassOutcome, RewriteOutcome,
};
pub use paths::{apply_renames, plan_renames, FileFailure, RenameOutcome, RenameWarning};
pub use plan::{FileCategory, FileTarget, PathRename, RenameLedger, RenamePlan};
pub use walk::{walk, Entry, PathFilter};
