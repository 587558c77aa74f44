//! Source adapters ("binds")
//!
//! A bind resolves a raw value for a fully-qualified element path from one
//! external origin. "Not found" is `None`, never an error - a bind that has
//! no opinion simply falls through to the next one in precedence order.

mod env;
mod map;

pub use env::{EnvBind, EnvBindBuilder, EnvSource, ProcessEnv};
pub use map::MapBind;

use serde_json::Value;

/// Contract implemented by each source adapter
pub trait Bind: Send + Sync {
    /// Fixed identifying tag, e.g. `"EnvironmentVariable"`
    fn name(&self) -> &str;

    /// Resolve a raw value for a fully-qualified `section.element` path
    fn retrieve(&self, path: &str) -> Option<Value>;

    /// Resolve by section and element name. Joins the two with `.` and
    /// delegates to [`retrieve`](Self::retrieve).
    fn get(&self, section: &str, element: &str) -> Option<Value> {
        self.retrieve(&format!("{section}.{element}"))
    }
}
