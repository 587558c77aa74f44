//! Component name sanitization
//!
//! Every ConfigBound, Section and Element name passes through [`sanitize`] at
//! construction time. Values are never sanitized.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Alphanumeric, with `_`, `-` and `.` allowed strictly in the interior.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("valid name pattern")
});

/// Trim surrounding whitespace and check the result against the naming rule.
///
/// The trimmed name must be non-empty, composed of ASCII alphanumerics plus
/// interior `_`, `-` or `.` separators, and must start and end with an
/// alphanumeric character.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when the rule is violated.
///
/// # Example
/// ```
/// use confbind::sanitize;
///
/// assert_eq!(sanitize("  database ").unwrap(), "database");
/// assert!(sanitize("_private").is_err());
/// ```
pub fn sanitize(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if NAME_PATTERN.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(Error::InvalidName(raw.to_string()))
    }
}
