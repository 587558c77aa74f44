//! Environment variable bind
//!
//! Maps `section.element` paths onto environment variable names and coerces
//! the string values the environment hands back into typed JSON values.

use crate::bind::Bind;
use crate::error::{Error, Result};
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer pattern"));

static FLOAT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("valid float pattern"));

/// Read access to an environment-like variable table.
///
/// The process environment is the default; tests inject a map-backed fake so
/// lookups never touch (or race on) global process state.
pub trait EnvSource: Send + Sync {
    /// Value of the named variable, `None` when absent
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Custom path-to-variable-name mapping function
pub type NamingFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Bind resolving values from environment variables
///
/// Name mapping: `.` becomes `_`, everything is uppercased, and an optional
/// prefix is prepended - section `database`, element `host`, prefix `MYAPP`
/// reads `MYAPP_DATABASE_HOST`. A custom naming function may be supplied
/// instead of a prefix; configuring both is a construction-time error.
///
/// # Example
/// ```
/// use confbind::bind::{Bind, EnvBind};
///
/// let bind = EnvBind::builder().prefix("MYAPP").build().unwrap();
/// // Reads MYAPP_DATABASE_HOST; absent variables yield None, never an error
/// assert_eq!(bind.get("database", "host"), None);
/// ```
#[derive(Clone)]
pub struct EnvBind {
    prefix: Option<String>,
    namer: Option<NamingFn>,
    source: Arc<dyn EnvSource>,
}

impl EnvBind {
    /// Bind with the default name mapping and the process environment
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: None,
            namer: None,
            source: Arc::new(ProcessEnv),
        }
    }

    /// Bind with a prefix prepended to every variable name
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            namer: None,
            source: Arc::new(ProcessEnv),
        }
    }

    /// Create a builder for full control over naming and source
    #[must_use]
    pub fn builder() -> EnvBindBuilder {
        EnvBindBuilder::new()
    }

    /// Environment variable name a path maps to
    #[must_use]
    pub fn var_name(&self, path: &str) -> String {
        if let Some(namer) = &self.namer {
            return namer(path);
        }
        let base = path.replace('.', "_").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{base}", prefix.to_uppercase()),
            None => base,
        }
    }
}

impl Default for EnvBind {
    fn default() -> Self {
        Self::new()
    }
}

impl Bind for EnvBind {
    fn name(&self) -> &str {
        "EnvironmentVariable"
    }

    fn retrieve(&self, path: &str) -> Option<Value> {
        let var_name = self.var_name(path);
        let raw = self.source.var(&var_name)?;
        let value = coerce(&raw);
        debug!("Env var {var_name} supplied value for {path}");
        Some(value)
    }
}

/// Best-effort coercion from the string-typed environment, in strict order:
/// integer, float, boolean literal, bracket/brace-delimited JSON, raw
/// string. A JSON-looking string that fails to parse passes through
/// unchanged - bind-level coercion never raises.
fn coerce(raw: &str) -> Value {
    if INTEGER_PATTERN.is_match(raw) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Number(n.into());
        }
    }

    if FLOAT_PATTERN.is_match(raw) {
        if let Ok(n) = raw.parse::<f64>() {
            if let Some(num) = serde_json::Number::from_f64(n) {
                return Value::Number(num);
            }
        }
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    let trimmed = raw.trim();
    let json_like = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if json_like {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
        debug!("Value looked like JSON but did not parse; passing raw string through");
    }

    Value::String(raw.to_string())
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`EnvBind`]
#[derive(Default)]
pub struct EnvBindBuilder {
    prefix: Option<String>,
    namer: Option<NamingFn>,
    source: Option<Arc<dyn EnvSource>>,
}

impl EnvBindBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Prepend `PREFIX_` to every variable name
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Supply a custom path-to-name mapping instead of the prefix scheme
    #[must_use]
    pub fn namer<F>(mut self, namer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.namer = Some(Arc::new(namer));
        self
    }

    /// Read variables from a custom source instead of the process
    /// environment
    #[must_use]
    pub fn source(mut self, source: Arc<dyn EnvSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the bind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when both a prefix and a custom naming
    /// function are configured - the two are mutually exclusive.
    pub fn build(self) -> Result<EnvBind> {
        if self.prefix.is_some() && self.namer.is_some() {
            return Err(Error::Config(
                "EnvBind prefix and custom naming function are mutually exclusive".into(),
            ));
        }
        Ok(EnvBind {
            prefix: self.prefix,
            namer: self.namer,
            source: self.source.unwrap_or_else(|| Arc::new(ProcessEnv)),
        })
    }
}
