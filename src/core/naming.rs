//! Identifier rule for the new project name.
//!
//! The name has to work as a dotted namespace path, so every character is an
//! ASCII letter, digit, `.` or `_`, and the first one is a letter or `_`.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9._]*$").expect("identifier pattern is valid")
});

/// Check a candidate name against the identifier rule. Never fails.
pub fn validate(candidate: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(candidate)
}

/// Validate a candidate, returning an argument error describing the rule.
pub fn require_valid<'a>(field: &str, candidate: &'a str) -> Result<&'a str> {
    if validate(candidate) {
        return Ok(candidate);
    }

    let problem = if candidate.is_empty() {
        "Name cannot be empty".to_string()
    } else {
        format!(
            "'{}' must start with a letter or underscore and contain only letters, digits, '.' or '_'",
            candidate
        )
    };

    Err(
        Error::validation_invalid_argument(field, problem, Some(candidate.to_string()))
            .with_hint("Example: Contoso.Utilities"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_and_underscored_names() {
        for name in ["My.Library", "_internal", "A", "Lib2", "Company.Product.Core", "a_b.c_d"] {
            assert!(validate(name), "expected '{}' to be valid", name);
        }
    }

    #[test]
    fn rejects_leading_digit_and_punctuation() {
        for name in ["123Bad", "9", ".Hidden", "-dash", "My-Library", "My Library", "Lib$", "é"] {
            assert!(!validate(name), "expected '{}' to be invalid", name);
        }
    }

    #[test]
    fn rejects_empty_string() {
        assert!(!validate(""));
    }

    #[test]
    fn trailing_newline_is_not_accepted() {
        assert!(!validate("MyLibrary\n"));
    }

    #[test]
    fn require_valid_reports_the_candidate() {
        let err = require_valid("new_name", "123Bad").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["field"], "new_name");
        assert_eq!(err.details["id"], "123Bad");
        assert!(err.details.get("tried").is_none());
    }
}
