//! # confbind - Typed Configuration Binding
//!
//! A framework-agnostic library for declaring a schema of named
//! configuration values, resolving each value from one or more external
//! sources, validating it against a declared rule, and falling back to a
//! static default.
//!
//! ## Features
//!
//! - **Schema compilation**: A declarative literal compiles into a tree of
//!   sections and elements wired to a [`ConfigBound`] container
//! - **Source precedence**: Binds are tried in attachment order; the first
//!   to answer wins
//! - **Uniform validation**: Every bind-supplied value passes the element's
//!   rule; defaults are validated once at construction
//! - **Startup validation**: One aggregated report of every missing required
//!   value and every invalid bound value
//! - **Export projections**: Markdown and JSON (optionally YAML) schema
//!   dumps with sensitive-value masking
//!
//! ## Quick Start
//!
//! ```rust
//! use confbind::bind::EnvBind;
//! use confbind::schema::{BuildOptions, ItemSpec, SectionSpec};
//! use confbind::{Rule, schema};
//! use serde_json::json;
//!
//! let literal = schema! {
//!     "port" => ItemSpec::new()
//!         .description("TCP listen port")
//!         .default_value(json!(3000))
//!         .rule(Rule::integer().min(1.0).max(65535.0)),
//!     "database" => SectionSpec::new()
//!         .property("host", ItemSpec::new().default_value(json!("localhost")))
//!         .property("password", ItemSpec::new().sensitive().rule(Rule::text().required())),
//! };
//!
//! let config = schema::build(
//!     literal,
//!     BuildOptions::new().name("app").bind(EnvBind::with_prefix("MYAPP")),
//! )
//! .unwrap();
//!
//! // MYAPP_APP_PORT would override the default here
//! assert_eq!(config.get("app", "port").unwrap(), Some(json!(3000)));
//! ```
//!
//! ## Resolution Precedence
//!
//! For a lookup `get(section, element)`:
//!
//! 1. Unknown section or element names fault (`SectionNotFound` /
//!    `ElementNotFound`) - a caller/schema mismatch, not a missing value.
//! 2. Binds are tried in attachment order. The first defined value is
//!    validated: rejection is an immediate `InvalidValue` fault, never
//!    silently replaced by a later bind or the default.
//! 3. With no bind hit, the element's default applies; with no default the
//!    result is unset (`Ok(None)`, or `Unset` via the failing accessors).
//!
//! ## Startup Validation
//!
//! ```rust
//! use confbind::schema::{BuildOptions, ItemSpec};
//! use confbind::{Rule, schema};
//!
//! let literal = schema! {
//!     "api_key" => ItemSpec::new().rule(Rule::text().required()),
//! };
//!
//! // Fails atomically: the required value is nowhere to be found
//! let result = schema::build(literal, BuildOptions::new().validate_on_init());
//! assert!(result.is_err());
//! ```
//!
//! ## Concurrency
//!
//! Lookups are pure functions of state that is immutable once wiring is
//! done, so sharing a container across threads for concurrent reads is
//! safe. Concurrent mutation (`add_bind`/`add_section` while other tasks
//! resolve) must be externally serialized.

// Core modules
mod container;
mod element;
mod error;
mod naming;
mod section;
mod sync;
mod validate;

// Grouped modules
pub mod bind;
pub mod export;
pub mod schema;

// Re-exports from core
pub use container::{ConfigBound, ValueProvider};
pub use element::{Element, ElementBuilder};
pub use error::{Error, Result, ValidationIssue, ValidationReport};
pub use naming::sanitize;
pub use section::Section;
pub use validate::{Rule, Validate, ValueKind};

// Re-exports from grouped modules
pub use bind::{Bind, EnvBind, MapBind};
pub use export::ExportConfig;
pub use schema::{BuildOptions, ItemSpec, Schema, SchemaNode, SectionSpec};
