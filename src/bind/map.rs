//! In-memory map bind
//!
//! A bind backed by a plain path-to-value map. Useful as a programmatic
//! override layer ahead of an [`EnvBind`](crate::bind::EnvBind), and as the
//! deterministic source in tests.

use crate::bind::Bind;
use serde_json::Value;
use std::collections::HashMap;

/// Bind resolving values from an in-memory map keyed by fully-qualified path
///
/// # Example
/// ```
/// use confbind::bind::{Bind, MapBind};
/// use serde_json::json;
///
/// let bind = MapBind::new().with("database.host", json!("db.example.com"));
/// assert_eq!(bind.get("database", "host"), Some(json!("db.example.com")));
/// assert_eq!(bind.get("database", "port"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapBind {
    values: HashMap<String, Value>,
}

impl MapBind {
    /// Empty map bind
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for a fully-qualified path (builder style)
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    /// Insert or replace a value for a fully-qualified path
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(path.into(), value.into());
    }
}

impl Bind for MapBind {
    fn name(&self) -> &str {
        "InMemoryMap"
    }

    fn retrieve(&self, path: &str) -> Option<Value> {
        self.values.get(path).cloned()
    }
}
