//! A single named configuration leaf
//!
//! An [`Element`] carries identity, documentation metadata, an optional
//! default and a validation rule. It never fetches values itself: resolution
//! is delegated to a [`ValueProvider`], normally the owning `ConfigBound`.

use crate::container::ValueProvider;
use crate::error::{Error, Result};
use crate::naming::sanitize;
use crate::validate::{Rule, Validate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named, typed configuration leaf
///
/// Identity and the validation rule are immutable after construction. The
/// parent-section back-reference is set exactly once when the element is
/// added to a `Section`.
///
/// # Example
/// ```
/// use confbind::{Element, Rule};
/// use serde_json::json;
///
/// let port = Element::builder("port")
///     .description("TCP listen port")
///     .default_value(json!(3000))
///     .rule(Rule::integer().min(1.0).max(65535.0))
///     .build()
///     .unwrap();
///
/// assert_eq!(port.name(), "port");
/// assert_eq!(port.default_value(), Some(&json!(3000)));
/// ```
#[derive(Clone)]
pub struct Element {
    name: String,
    description: Option<String>,
    default: Option<Value>,
    example: Option<Value>,
    sensitive: bool,
    omit_from_schema: bool,
    rule: Arc<dyn Validate>,
    section: Option<String>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("example", &self.example)
            .field("sensitive", &self.sensitive)
            .field("omit_from_schema", &self.omit_from_schema)
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

impl Element {
    /// Create a builder for an element with the given name
    pub fn builder(name: impl Into<String>) -> ElementBuilder {
        ElementBuilder::new(name)
    }

    /// Sanitized element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Static default value, validated once at construction
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Documentation-only example value (never validated)
    pub fn example(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    /// Whether the value should be masked wherever displayed
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Whether the element is excluded from schema exports by default
    pub fn omitted_from_schema(&self) -> bool {
        self.omit_from_schema
    }

    /// Name of the owning section, once attached
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// True iff the element's rule declares the value as required
    pub fn is_required(&self) -> bool {
        self.rule.is_required()
    }

    /// The validation rule applied to every resolved value
    pub fn rule(&self) -> &Arc<dyn Validate> {
        &self.rule
    }

    /// Fully-qualified `section.element` path, or the bare name if detached
    pub fn path(&self) -> String {
        match &self.section {
            Some(section) => format!("{section}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Resolve the current value through the given provider.
    ///
    /// `Ok(None)` means no bind supplied a value and no default is declared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detached`] if the element was never added to a
    /// section - a programming error, not a missing value. Propagates any
    /// resolution error from the provider.
    pub fn resolve(&self, provider: &dyn ValueProvider) -> Result<Option<Value>> {
        let section = self
            .section
            .as_deref()
            .ok_or_else(|| Error::Detached(self.name.clone()))?;
        provider.value_of(section, &self.name)
    }

    /// Resolve the current value, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unset`] when [`resolve`](Self::resolve) yields no
    /// value.
    pub fn resolve_or_fail(&self, provider: &dyn ValueProvider) -> Result<Value> {
        self.resolve(provider)?
            .ok_or_else(|| Error::Unset(self.path()))
    }

    /// Record the owning section. Set exactly once, by `Section::add_element`.
    pub(crate) fn attach(&mut self, section: &str) {
        self.section = Some(section.to_string());
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Element`] with a fluent API
pub struct ElementBuilder {
    name: String,
    description: Option<String>,
    default: Option<Value>,
    example: Option<Value>,
    sensitive: bool,
    omit_from_schema: bool,
    rule: Arc<dyn Validate>,
}

impl ElementBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: None,
            example: None,
            sensitive: false,
            omit_from_schema: false,
            rule: Arc::new(Rule::any()),
        }
    }

    /// Set the human-readable description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the static default value
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set a documentation-only example value (may be a placeholder; it is
    /// never validated)
    #[must_use]
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Mask the value in logs and exports
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Exclude the element from schema exports by default
    #[must_use]
    pub fn omit_from_schema(mut self) -> Self {
        self.omit_from_schema = true;
        self
    }

    /// Set the declarative validation rule
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = Arc::new(rule);
        self
    }

    /// Set a custom validation implementation
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn Validate>) -> Self {
        self.rule = validator;
        self
    }

    /// Build the element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when the name fails sanitization, or
    /// [`Error::InvalidValue`] when a declared default is rejected by the
    /// rule. Fast-fail on schema authoring mistakes: the default is checked
    /// here, once, and never re-validated at resolution time.
    pub fn build(self) -> Result<Element> {
        let name = sanitize(&self.name)?;

        if let Some(ref default) = self.default {
            self.rule.check(default).map_err(|reason| Error::InvalidValue {
                path: name.clone(),
                reason,
            })?;
        }

        Ok(Element {
            name,
            description: self.description,
            default: self.default,
            example: self.example,
            sensitive: self.sensitive,
            omit_from_schema: self.omit_from_schema,
            rule: self.rule,
            section: None,
        })
    }
}
