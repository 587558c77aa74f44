//! Top-level container and resolution authority
//!
//! `ConfigBound` owns the sections and the ordered bind list, and implements
//! the precedence algorithm: first bind (in attachment order) to return a
//! defined value wins and is validated; otherwise the element default;
//! otherwise unset.
//!
//! Lookups are pure functions of state that is immutable after wiring, so
//! concurrent reads are safe. Attaching binds or sections while other tasks
//! resolve values is not guaranteed safe and must be externally serialized.

use crate::bind::Bind;
use crate::error::{Error, Result, ValidationIssue, ValidationReport};
use crate::naming::sanitize;
use crate::section::Section;
use crate::sync::RwLockExt;
use log::{debug, info};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

/// The resolution authority an element or section calls into for a concrete
/// value.
///
/// Implemented by `ConfigBound`; consumed by `Element::resolve` and, through
/// a weak handle installed at add time, by `Section::resolve_value`.
pub trait ValueProvider: Send + Sync {
    /// Resolved value for `section.element`; `Ok(None)` means unset.
    ///
    /// # Errors
    ///
    /// Unknown names fault with `SectionNotFound`/`ElementNotFound` - a
    /// caller/schema mismatch, distinct from a legitimately absent value. A
    /// bind-supplied value rejected by the element's rule faults with
    /// `InvalidValue`.
    fn value_of(&self, section: &str, element: &str) -> Result<Option<Value>>;
}

/// Top-level container owning sections and binds
///
/// Cloning yields another handle onto the same container state.
///
/// # Example
/// ```
/// use confbind::bind::MapBind;
/// use confbind::{ConfigBound, Element, Rule, Section};
/// use serde_json::json;
///
/// let config = ConfigBound::new("app").unwrap();
/// config
///     .add_section(Section::new(
///         "server",
///         vec![
///             Element::builder("port")
///                 .default_value(json!(3000))
///                 .rule(Rule::integer().min(1.0).max(65535.0))
///                 .build()
///                 .unwrap(),
///         ],
///     ).unwrap())
///     .unwrap();
/// config.add_bind(MapBind::new().with("server.port", json!(8080))).unwrap();
///
/// assert_eq!(config.get("server", "port").unwrap(), Some(json!(8080)));
/// ```
#[derive(Clone)]
pub struct ConfigBound {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    binds: RwLock<Vec<Box<dyn Bind>>>,
    sections: RwLock<Vec<Section>>,
}

impl fmt::Debug for ConfigBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBound")
            .field("name", &self.inner.name)
            .field("binds", &self.bind_names())
            .field("sections", &self.section_names())
            .finish()
    }
}

impl ConfigBound {
    /// Create an empty container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when the name fails sanitization.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = sanitize(&name.into())?;
        info!("Initialized configuration container '{name}'");
        Ok(Self {
            inner: Arc::new(Inner {
                name,
                binds: RwLock::new(Vec::new()),
                sections: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Sanitized container name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // =========================================================================
    // Wiring
    // =========================================================================

    /// Attach a bind. Precedence is strictly attachment order: earlier binds
    /// win.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] only if lock recovery fails.
    pub fn add_bind(&self, bind: impl Bind + 'static) -> Result<()> {
        self.add_boxed_bind(Box::new(bind))
    }

    /// Attach an already-boxed bind
    pub fn add_boxed_bind(&self, bind: Box<dyn Bind>) -> Result<()> {
        let mut binds = self.inner.binds.write_recovered()?;
        info!("Attached bind '{}' to '{}'", bind.name(), self.inner.name);
        binds.push(bind);
        Ok(())
    }

    /// Add a section and wire its value-provider handle back to this
    /// container, so later element resolutions route through it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionExists`] when a section of the same name is
    /// already present.
    pub fn add_section(&self, mut section: Section) -> Result<()> {
        let mut sections = self.inner.sections.write_recovered()?;
        if sections.iter().any(|s| s.name() == section.name()) {
            return Err(Error::SectionExists(section.name().to_string()));
        }
        let weak = Arc::downgrade(&self.inner);
        let provider: Weak<dyn ValueProvider> = weak;
        section.attach_provider(provider);
        debug!(
            "Added section '{}' to '{}' ({} element(s))",
            section.name(),
            self.inner.name,
            section.elements().len()
        );
        sections.push(section);
        Ok(())
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Snapshot of all sections in insertion order
    pub fn sections(&self) -> Vec<Section> {
        self.inner
            .sections
            .read_recovered()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Snapshot of a section by name
    pub fn section(&self, name: &str) -> Option<Section> {
        self.inner
            .sections
            .read_recovered()
            .ok()
            .and_then(|guard| guard.iter().find(|s| s.name() == name).cloned())
    }

    /// Section names in insertion order
    pub fn section_names(&self) -> Vec<String> {
        self.inner
            .sections
            .read_recovered()
            .map(|guard| guard.iter().map(|s| s.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Bind tags in precedence order
    pub fn bind_names(&self) -> Vec<String> {
        self.inner
            .binds
            .read_recovered()
            .map(|guard| guard.iter().map(|b| b.name().to_string()).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve `section.element`; `Ok(None)` means unset.
    ///
    /// # Errors
    ///
    /// See [`ValueProvider::value_of`].
    pub fn get(&self, section: &str, element: &str) -> Result<Option<Value>> {
        self.inner.value_of(section, element)
    }

    /// Resolve `section.element`, failing when the value is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unset`] for a known element with no value - a
    /// distinct kind from [`Error::ElementNotFound`], which signals a name
    /// the schema does not know at all.
    pub fn get_or_fail(&self, section: &str, element: &str) -> Result<Value> {
        self.get(section, element)?
            .ok_or_else(|| Error::Unset(format!("{section}.{element}")))
    }

    /// Resolve and deserialize into a concrete type.
    ///
    /// # Errors
    ///
    /// As [`get_or_fail`](Self::get_or_fail), plus [`Error::Parse`] when the
    /// resolved value does not deserialize into `T`.
    pub fn get_as<T>(&self, section: &str, element: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.get_or_fail(section, element)?;
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    // =========================================================================
    // Full-tree validation
    // =========================================================================

    /// Walk every element and collect all problems without failing.
    ///
    /// Records a "Required value is not set" issue for each required element
    /// that resolves to unset, and one issue per bind-supplied value the
    /// element's rule rejects.
    ///
    /// # Errors
    ///
    /// Propagates only non-validation faults (lock recovery failure).
    pub fn validation_errors(&self) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for section in self.sections() {
            for element in section.elements() {
                match self.get(section.name(), element.name()) {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        if element.is_required() {
                            issues.push(ValidationIssue::new(
                                format!("{}.{}", section.name(), element.name()),
                                "Required value is not set",
                            ));
                        }
                    }
                    Err(Error::InvalidValue { path, reason }) => {
                        issues.push(ValidationIssue::new(path, reason));
                    }
                    Err(other) => return Err(other),
                }
            }
        }
        Ok(issues)
    }

    /// Eagerly validate the whole tree, aggregating every problem into one
    /// failure.
    ///
    /// Applications are expected to call this (or build with
    /// `validate_on_init`) at startup, so misconfiguration surfaces as a
    /// single readable report instead of scattered lookup errors later.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every offending path when any
    /// issue is found.
    pub fn validate(&self) -> Result<()> {
        let issues = self.validation_errors()?;
        if issues.is_empty() {
            info!("Configuration '{}' validated cleanly", self.inner.name);
            Ok(())
        } else {
            Err(Error::Validation(ValidationReport(issues)))
        }
    }
}

impl ValueProvider for ConfigBound {
    fn value_of(&self, section: &str, element: &str) -> Result<Option<Value>> {
        self.inner.value_of(section, element)
    }
}

impl ValueProvider for Inner {
    fn value_of(&self, section: &str, element: &str) -> Result<Option<Value>> {
        let target = {
            let sections = self.sections.read_recovered()?;
            let found = sections
                .iter()
                .find(|s| s.name() == section)
                .ok_or_else(|| Error::SectionNotFound(section.to_string()))?;
            found
                .element(element)
                .ok_or_else(|| Error::ElementNotFound(element.to_string()))?
                .clone()
        };

        let binds = self.binds.read_recovered()?;
        for bind in binds.iter() {
            let Some(raw) = bind.get(section, element) else {
                continue;
            };
            // First bind to answer wins; an invalid answer is always an
            // error, never silently replaced by a later bind or the default.
            let accepted = target.rule().check(&raw).map_err(|reason| {
                Error::InvalidValue {
                    path: format!("{section}.{element}"),
                    reason,
                }
            })?;
            debug!(
                "Resolved {section}.{element} from bind '{}'",
                bind.name()
            );
            return Ok(Some(accepted));
        }

        // Defaults were validated at element construction; no re-check here.
        Ok(target.default_value().cloned())
    }
}
