//! Validation rule contract and the built-in declarative rule
//!
//! Elements delegate value validation to a pluggable [`Validate`]
//! implementation. The crate treats that implementation as a black box: a
//! predicate that may also normalize the accepted value, plus a "required"
//! presence flag that drives full-tree validation.
//!
//! [`Rule`] is the built-in, serde-able implementation covering the common
//! cases: a declared value kind plus optional numeric range, regex pattern
//! and allowed-options constraints.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Contract applied to every resolved value, and once to each default at
/// element construction.
///
/// A successful check may return a normalized form of the candidate (e.g. a
/// coerced or trimmed value); the normalized value is what resolution
/// returns to the caller.
pub trait Validate: Send + Sync {
    /// Check a candidate value, returning the (possibly normalized) accepted
    /// value or a human-readable rejection message.
    fn check(&self, candidate: &Value) -> std::result::Result<Value, String>;

    /// Whether a value is required to be present for this rule.
    ///
    /// Used by `ConfigBound::validate` to flag unset-but-required elements.
    fn is_required(&self) -> bool {
        false
    }
}

// =============================================================================
// Value Kinds
// =============================================================================

/// Declared type of a configuration value
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Accept any JSON value
    #[default]
    Any,
    /// Boolean
    Bool,
    /// Integer number
    Integer,
    /// Floating-point number
    Float,
    /// String
    Text,
    /// JSON array
    List,
}

// =============================================================================
// Declarative Rule
// =============================================================================

/// The crate's built-in declarative validation rule
///
/// # Example
/// ```
/// use confbind::{Rule, Validate};
/// use serde_json::json;
///
/// let port = Rule::integer().min(1.0).max(65535.0);
/// assert!(port.check(&json!(8080)).is_ok());
/// assert!(port.check(&json!(70000)).is_err());
/// assert!(port.check(&json!("notanumber")).is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Declared value kind
    #[serde(default)]
    pub kind: ValueKind,

    /// Presence flag: `true` marks the value as required
    #[serde(default)]
    pub required: bool,

    /// Minimum for numeric kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum for numeric kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Regex pattern for the Text kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Allowed values (any kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,

    // Pattern compiled on first use
    #[serde(skip)]
    compiled: OnceLock<Regex>,
}

// Equality is over the declarative fields only
impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.required == other.required
            && self.min == other.min
            && self.max == other.max
            && self.pattern == other.pattern
            && self.options == other.options
    }
}

impl Rule {
    // =========================================================================
    // Kind-specific constructors
    // =========================================================================

    /// Accept-anything rule (the default when an item declares none)
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Boolean rule
    #[must_use]
    pub fn boolean() -> Self {
        Self {
            kind: ValueKind::Bool,
            ..Default::default()
        }
    }

    /// Integer rule
    #[must_use]
    pub fn integer() -> Self {
        Self {
            kind: ValueKind::Integer,
            ..Default::default()
        }
    }

    /// Float rule
    #[must_use]
    pub fn float() -> Self {
        Self {
            kind: ValueKind::Float,
            ..Default::default()
        }
    }

    /// Text rule
    #[must_use]
    pub fn text() -> Self {
        Self {
            kind: ValueKind::Text,
            ..Default::default()
        }
    }

    /// List rule (JSON array)
    #[must_use]
    pub fn list() -> Self {
        Self {
            kind: ValueKind::List,
            ..Default::default()
        }
    }

    /// Rule accepting only the given values
    #[must_use]
    pub fn one_of(options: Vec<Value>) -> Self {
        Self {
            options: Some(options),
            ..Default::default()
        }
    }

    // =========================================================================
    // Constraint setters (builder pattern)
    // =========================================================================

    /// Mark the value as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the minimum for numeric kinds
    #[must_use]
    pub fn min(mut self, val: f64) -> Self {
        self.min = Some(val);
        self
    }

    /// Set the maximum for numeric kinds
    #[must_use]
    pub fn max(mut self, val: f64) -> Self {
        self.max = Some(val);
        self
    }

    /// Set a regex pattern for the Text kind
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.compiled = OnceLock::new();
        self
    }

    // =========================================================================
    // Rule self-validation
    // =========================================================================

    /// Validate the rule definition itself
    ///
    /// Checks that min <= max, the pattern is a non-empty valid regex, and
    /// an options list is non-empty. The schema builder runs this for every
    /// declared rule before compiling elements.
    pub fn verify(&self) -> std::result::Result<(), String> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(format!("min ({min}) cannot be greater than max ({max})"));
            }
        }

        if let Some(ref pattern) = self.pattern {
            if pattern.is_empty() {
                return Err("Pattern cannot be empty string".to_string());
            }
            // Warms the cache for later checks
            self.pattern_regex(pattern)?;
        }

        if let Some(ref options) = self.options {
            if options.is_empty() {
                return Err("Options list cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Compiled pattern, built on first use and reused afterwards
    fn pattern_regex(&self, pattern: &str) -> std::result::Result<&Regex, String> {
        if let Some(re) = self.compiled.get() {
            return Ok(re);
        }
        let re = Regex::new(pattern).map_err(|e| format!("Invalid regex pattern: {e}"))?;
        Ok(self.compiled.get_or_init(|| re))
    }

    fn check_range(&self, num: f64) -> std::result::Result<(), String> {
        if let Some(min) = self.min {
            if num < min {
                return Err(format!("Value must be at least {min}"));
            }
        }
        if let Some(max) = self.max {
            if num > max {
                return Err(format!("Value must be at most {max}"));
            }
        }
        Ok(())
    }
}

impl Validate for Rule {
    fn check(&self, candidate: &Value) -> std::result::Result<Value, String> {
        match self.kind {
            ValueKind::Any => {}
            ValueKind::Bool => {
                if !candidate.is_boolean() {
                    return Err("Value must be a boolean".to_string());
                }
            }
            ValueKind::Integer => {
                let num = candidate
                    .as_i64()
                    .ok_or_else(|| "Value must be an integer".to_string())?;
                self.check_range(num as f64)?;
            }
            ValueKind::Float => {
                let num = candidate
                    .as_f64()
                    .ok_or_else(|| "Value must be a number".to_string())?;
                self.check_range(num)?;
            }
            ValueKind::Text => {
                let text = candidate
                    .as_str()
                    .ok_or_else(|| "Value must be a string".to_string())?;
                if let Some(ref pattern) = self.pattern {
                    if !self.pattern_regex(pattern)?.is_match(text) {
                        return Err(format!("Value does not match pattern: {pattern}"));
                    }
                }
            }
            ValueKind::List => {
                if !candidate.is_array() {
                    return Err("Value must be an array".to_string());
                }
            }
        }

        if let Some(ref options) = self.options {
            if !options.contains(candidate) {
                return Err("Value must be one of the allowed options".to_string());
            }
        }

        Ok(candidate.clone())
    }

    fn is_required(&self) -> bool {
        self.required
    }
}
