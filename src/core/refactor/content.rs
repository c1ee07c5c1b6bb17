//! Placeholder substitution in file contents.
//!
//! Replacement is byte-exact outside the matched spans: line endings, a
//! missing trailing newline and any BOM come out exactly as they went in.
//! Files are only written when at least one replacement happened.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::paths::FileFailure;
use super::plan::{FileCategory, FileTarget, RenameLedger};
use crate::defaults::{CategoryRule, FileErrorPolicy};
use crate::error::Result;
use crate::utils::{io, paths};

/// How occurrences of the placeholder are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every substring occurrence.
    #[default]
    Literal,
    /// Only occurrences not glued to neighbouring identifier characters.
    Identifier,
}

/// Result of rewriting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Replaced(usize),
    Unchanged,
    /// Contents are not UTF-8; nothing was written.
    NotText,
}

/// An edit applied to a file's content.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    pub file: String,
    pub category: FileCategory,
    pub replacements: usize,
}

/// A file left alone on purpose.
#[derive(Debug, Clone, Serialize)]
pub struct FileSkip {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PassOutcome {
    pub updated: Vec<FileEdit>,
    pub unchanged: usize,
    pub skipped: Vec<FileSkip>,
    pub failures: Vec<FileFailure>,
}

// ============================================================================
// Category selection
// ============================================================================

/// Category of a relative path under the first matching rule.
pub fn classify(relative: &str, rules: &[CategoryRule]) -> Option<FileCategory> {
    rules
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| matches_pattern(p, relative)))
        .map(|rule| rule.category)
}

/// Glob match where a leading `**/` also matches at the root.
fn matches_pattern(pattern: &str, relative: &str) -> bool {
    if glob_match::glob_match(pattern, relative) {
        return true;
    }
    match pattern.strip_prefix("**/") {
        Some(rest) => !relative.contains('/') && glob_match::glob_match(rest, relative),
        None => false,
    }
}

// ============================================================================
// Matching
// ============================================================================

fn is_identifier_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Byte offsets of every non-overlapping occurrence of `term` in `text`.
fn find_matches(text: &str, term: &str, mode: MatchMode) -> Vec<usize> {
    let mut matches = Vec::new();
    if term.is_empty() || term.len() > text.len() {
        return matches;
    }

    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let abs = start + pos;
        let end = abs + term.len();

        let accepted = match mode {
            MatchMode::Literal => true,
            MatchMode::Identifier => {
                let left_ok = abs == 0 || !is_identifier_byte(bytes[abs - 1]);
                let right_ok = end >= bytes.len() || !is_identifier_byte(bytes[end]);
                left_ok && right_ok
            }
        };

        if accepted {
            matches.push(abs);
            start = end;
        } else {
            // Advance by one whole character so the slice stays on a UTF-8 boundary.
            start = abs + text[abs..].chars().next().map_or(1, char::len_utf8);
        }
    }

    matches
}

/// Replace occurrences of `old` with `new`, returning the new text and the count.
pub fn replace_all(text: &str, old: &str, new: &str, mode: MatchMode) -> (String, usize) {
    let positions = find_matches(text, old, mode);
    if positions.is_empty() {
        return (text.to_string(), 0);
    }

    let mut out = String::with_capacity(text.len() + positions.len() * new.len());
    let mut last = 0;
    for &pos in &positions {
        out.push_str(&text[last..pos]);
        out.push_str(new);
        last = pos + old.len();
    }
    out.push_str(&text[last..]);

    (out, positions.len())
}

// ============================================================================
// File rewriting
// ============================================================================

/// Replace every literal occurrence of `old` in a file. Returns whether it changed.
pub fn rewrite_file(path: &Path, old: &str, new: &str) -> Result<bool> {
    let outcome = rewrite_file_with(path, old, new, MatchMode::Literal)?;
    Ok(matches!(outcome, RewriteOutcome::Replaced(_)))
}

/// Rewrite one file under `mode`, writing back only when something was replaced.
pub fn rewrite_file_with(path: &Path, old: &str, new: &str, mode: MatchMode) -> Result<RewriteOutcome> {
    let Some(text) = io::read_text(path, &format!("read {}", path.display()))? else {
        return Ok(RewriteOutcome::NotText);
    };

    let (rewritten, count) = replace_all(&text, old, new, mode);
    if count == 0 {
        return Ok(RewriteOutcome::Unchanged);
    }

    io::write_file(path, &rewritten, &format!("write {}", path.display()))?;
    Ok(RewriteOutcome::Replaced(count))
}

/// Rewrite every target, each file independently.
///
/// Target paths are resolved through `ledger` first. A failing file is recorded
/// and the pass continues unless `policy` is `Abort`.
pub fn rewrite_pass<'a>(
    root: &Path,
    targets: impl IntoIterator<Item = &'a FileTarget>,
    ledger: &RenameLedger,
    old: &str,
    new: &str,
    mode: MatchMode,
    policy: FileErrorPolicy,
) -> Result<PassOutcome> {
    let mut outcome = PassOutcome::default();

    for target in targets {
        let current = ledger.resolve(&target.path);
        let path = paths::join_relative(root, &current);

        match rewrite_file_with(&path, old, new, mode) {
            Ok(RewriteOutcome::Replaced(count)) => {
                tracing::debug!(file = %current, replacements = count, "rewrote");
                outcome.updated.push(FileEdit {
                    file: current,
                    category: target.category,
                    replacements: count,
                });
            }
            Ok(RewriteOutcome::Unchanged) => outcome.unchanged += 1,
            Ok(RewriteOutcome::NotText) => outcome.skipped.push(FileSkip {
                file: current,
                reason: "not valid UTF-8".to_string(),
            }),
            Err(err) => {
                if policy == FileErrorPolicy::Abort {
                    return Err(err);
                }
                let detail = err.details["error"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.message.clone());
                tracing::warn!(file = %current, error = %detail, "rewrite failed");
                outcome.failures.push(FileFailure {
                    file: current,
                    error: detail,
                });
            }
        }
    }

    Ok(outcome)
}
