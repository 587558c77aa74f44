//! Named, ordered collection of uniquely-named elements

use crate::container::ValueProvider;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::naming::sanitize;
use serde_json::Value;
use std::fmt;
use std::sync::Weak;

/// A named group of uniquely-named [`Element`]s
///
/// Element order is insertion order; it matters for enumeration and export,
/// never for lookup. A section is constructed standalone and wired to its
/// resolution authority when added to a `ConfigBound`: the container hands
/// it a weak provider handle, so ownership stays strictly one-directional.
///
/// # Example
/// ```
/// use confbind::{Element, Section};
/// use serde_json::json;
///
/// let host = Element::builder("host").default_value(json!("localhost")).build().unwrap();
/// let section = Section::new("database", vec![host]).unwrap();
/// assert_eq!(section.element("host").unwrap().section(), Some("database"));
/// ```
#[derive(Clone)]
pub struct Section {
    name: String,
    description: Option<String>,
    elements: Vec<Element>,
    provider: Option<Weak<dyn ValueProvider>>,
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("elements", &self.elements)
            .field("attached", &self.provider.is_some())
            .finish()
    }
}

impl Section {
    /// Create a section with an initial list of elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when the name fails sanitization, or
    /// [`Error::ElementExists`] when the initial list carries a duplicate
    /// element name - checked before any element is stored, so a failed
    /// construction leaves nothing behind.
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Result<Self> {
        let name = sanitize(&name.into())?;

        for (i, element) in elements.iter().enumerate() {
            if elements[..i].iter().any(|e| e.name() == element.name()) {
                return Err(Error::ElementExists(element.name().to_string()));
            }
        }

        let mut section = Self {
            name,
            description: None,
            elements: Vec::with_capacity(elements.len()),
            provider: None,
        };
        for element in elements {
            // Uniqueness already checked above
            section.push(element);
        }
        Ok(section)
    }

    /// Set the human-readable description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sanitized section name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Elements in insertion order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Look up an element by name; `None` rather than an error when absent
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name() == name)
    }

    /// Add an element, binding its parent-section back-reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementExists`] when an element of the same name is
    /// already present.
    pub fn add_element(&mut self, element: Element) -> Result<()> {
        if self.element(element.name()).is_some() {
            return Err(Error::ElementExists(element.name().to_string()));
        }
        self.push(element);
        Ok(())
    }

    /// Resolve an element's current value through the attached provider.
    ///
    /// Returns `Ok(None)` when the section is not attached to a container,
    /// the provider is gone, or no such element exists - an unattached
    /// section is a valid intermediate construction state, not a fault.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors such as `InvalidValue` from the
    /// provider.
    pub fn resolve_value(&self, element_name: &str) -> Result<Option<Value>> {
        let Some(provider) = self.provider.as_ref().and_then(Weak::upgrade) else {
            return Ok(None);
        };
        if self.element(element_name).is_none() {
            return Ok(None);
        }
        provider.value_of(&self.name, element_name)
    }

    /// Install the resolution authority. Called by the owning container at
    /// add time.
    pub(crate) fn attach_provider(&mut self, provider: Weak<dyn ValueProvider>) {
        self.provider = Some(provider);
    }

    fn push(&mut self, mut element: Element) {
        element.attach(&self.name);
        self.elements.push(element);
    }
}
