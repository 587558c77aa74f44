//! Error types for the confbind library

use std::fmt;
use thiserror::Error;

/// Result type alias for confbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for confbind library
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Naming Errors
    // -------------------------------------------------------------------------
    #[error(
        "Invalid name '{0}': must be non-empty, alphanumeric with interior '_', '-' or '.' separators"
    )]
    InvalidName(String),

    // -------------------------------------------------------------------------
    // Registration Errors
    // -------------------------------------------------------------------------
    #[error("Section '{0}' already exists")]
    SectionExists(String),

    #[error("Element '{0}' already exists in section")]
    ElementExists(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    #[error("Element '{0}' not found")]
    ElementNotFound(String),

    /// The element is known to the schema but no bind supplied a value and
    /// no default is declared. Distinct from `ElementNotFound`.
    #[error("No value set for '{0}'")]
    Unset(String),

    /// Resolution was attempted on an element that was never added to a
    /// section. This is a programming error, not a missing value.
    #[error("Element '{0}' is not attached to a section")]
    Detached(String),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Invalid value for {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Failed to parse value: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    /// Aggregate failure raised by `ConfigBound::validate`, listing every
    /// offending path. Use `ConfigBound::validation_errors` for the itemized
    /// non-raising variant.
    #[error("Configuration validation failed: {0}")]
    Validation(ValidationReport),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Internal lock was poisoned - possible thread panic")]
    LockPoisoned,
}

impl Error {
    /// Check if this is a "not found" type error.
    ///
    /// Covers both genuinely unknown names and known-but-unset elements,
    /// for callers that do not care about the distinction.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SectionNotFound(_) | Error::ElementNotFound(_) | Error::Unset(_)
        )
    }

    /// Check if this error was raised by a validation rule rejecting a value
    #[must_use]
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Error::InvalidValue { .. } | Error::Validation(_))
    }
}

// =============================================================================
// Validation Report
// =============================================================================

/// A single problem found while validating a configuration tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Fully-qualified `section.element` path
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue found by a full-tree validation walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport(pub Vec<ValidationIssue>);

impl ValidationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}
