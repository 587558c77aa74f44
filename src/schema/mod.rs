//! Declarative schema literals and the builder that compiles them
//!
//! A schema literal is a nested declarative structure consumed once at build
//! time: each key maps to either a section spec (carries `properties`) or an
//! item spec. The two shapes form an explicit tagged union - [`SchemaNode`] -
//! so compilation matches exhaustively instead of probing for fields.
//!
//! Top-level item specs are implicitly grouped into a section named after the
//! container (default `"app"`); section specs become named sections. The
//! compile is two-pass: sections are assembled with their full element lists
//! first, then plugged into the container through the normal `add_section`
//! path, so the container/section wiring never passes through a partially
//! built state.

use crate::bind::Bind;
use crate::container::ConfigBound;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::section::Section;
use crate::validate::Rule;
use log::info;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Schema Nodes
// =============================================================================

/// One entry of a schema literal: a section or a single item
///
/// Deserialization accepts exactly the two shapes; anything else is a fatal
/// build error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// A named group of items (`properties` present)
    Section(SectionSpec),
    /// A single configuration item
    Item(ItemSpec),
}

impl From<SectionSpec> for SchemaNode {
    fn from(spec: SectionSpec) -> Self {
        SchemaNode::Section(spec)
    }
}

impl From<ItemSpec> for SchemaNode {
    fn from(spec: ItemSpec) -> Self {
        SchemaNode::Item(spec)
    }
}

/// Declarative spec for a single element
///
/// Field names follow the conventional literal format (`omitFromSchema`);
/// `validator` is accepted as an alias for `rule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Documentation-only example, never validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub omit_from_schema: bool,

    #[serde(default, alias = "validator", skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

impl ItemSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn omit_from_schema(mut self) -> Self {
        self.omit_from_schema = true;
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }
}

/// Declarative spec for a named section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Item specs in declaration order
    pub properties: Properties,
}

impl SectionSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, spec: ItemSpec) -> Self {
        self.properties.0.push((name.into(), spec));
        self
    }
}

/// Order-preserving map of item specs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(pub Vec<(String, ItemSpec)>);

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of item specs")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, spec)) = access.next_entry::<String, ItemSpec>()? {
                    entries.push((name, spec));
                }
                Ok(Properties(entries))
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// An ordered schema literal, ready to be compiled by [`build`]
///
/// # Example
/// ```
/// use confbind::schema::{BuildOptions, ItemSpec, SectionSpec};
/// use confbind::{Rule, schema};
/// use serde_json::json;
///
/// let literal = schema! {
///     "port" => ItemSpec::new().default_value(json!(3000)).rule(Rule::integer()),
///     "database" => SectionSpec::new()
///         .property("host", ItemSpec::new().default_value(json!("localhost"))),
/// };
///
/// let config = schema::build(literal, BuildOptions::new()).unwrap();
/// assert_eq!(config.section_names(), ["app", "database"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    nodes: Vec<(String, SchemaNode)>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, keeping literal order
    pub fn push(&mut self, name: impl Into<String>, node: impl Into<SchemaNode>) {
        self.nodes.push((name.into(), node.into()));
    }

    /// Append an item spec (builder style)
    #[must_use]
    pub fn item(mut self, name: impl Into<String>, spec: ItemSpec) -> Self {
        self.push(name, spec);
        self
    }

    /// Append a section spec (builder style)
    #[must_use]
    pub fn section(mut self, name: impl Into<String>, spec: SectionSpec) -> Self {
        self.push(name, spec);
        self
    }

    /// Nodes in literal order
    pub fn nodes(&self) -> &[(String, SchemaNode)] {
        &self.nodes
    }

    /// Parse a schema literal from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the literal is not an object or any
    /// entry matches neither the section nor the item shape.
    ///
    /// # Example
    /// ```
    /// use confbind::schema::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_value(&json!({
    ///     "port": {"default": 3000},
    ///     "database": {"properties": {"host": {"default": "localhost"}}},
    /// }))
    /// .unwrap();
    /// assert_eq!(schema.nodes().len(), 2);
    /// ```
    pub fn from_value(literal: &Value) -> Result<Self> {
        let object = literal
            .as_object()
            .ok_or_else(|| Error::Parse("Schema literal must be an object".into()))?;

        let mut schema = Schema::new();
        for (key, node_value) in object {
            // An item spec must carry at least one recognized field; a bare
            // `{}` matches neither shape.
            if node_value.as_object().is_none_or(|fields| fields.is_empty()) {
                return Err(Error::Parse(format!(
                    "Unrecognized schema node '{key}': expected a section spec \
                     (with 'properties') or an item spec with at least one field"
                )));
            }
            let node: SchemaNode = serde_json::from_value(node_value.clone()).map_err(|_| {
                Error::Parse(format!(
                    "Unrecognized schema node '{key}': expected a section spec \
                     (with 'properties') or an item spec"
                ))
            })?;
            schema.push(key, node);
        }
        Ok(schema)
    }
}

/// Macro for building a [`Schema`] literal in declaration order
///
/// # Example
/// ```
/// use confbind::schema::{ItemSpec, SectionSpec};
/// use confbind::{Rule, schema};
/// use serde_json::json;
///
/// let literal = schema! {
///     "log_level" => ItemSpec::new()
///         .default_value(json!("info"))
///         .rule(Rule::one_of(vec![json!("debug"), json!("info"), json!("warn")])),
///     "database" => SectionSpec::new()
///         .property("host", ItemSpec::new().default_value(json!("localhost"))),
/// };
/// assert_eq!(literal.nodes().len(), 2);
/// ```
#[macro_export]
macro_rules! schema {
    ($($key:expr => $node:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut schema = $crate::schema::Schema::new();
        $(
            schema.push($key, $node);
        )*
        schema
    }};
}

// =============================================================================
// Build Options
// =============================================================================

/// Options for [`build`]
pub struct BuildOptions {
    name: String,
    binds: Vec<Box<dyn Bind>>,
    validate_on_init: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: "app".into(),
            binds: Vec::new(),
            validate_on_init: false,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Container name; also names the implicit section for top-level items
    /// (default `"app"`)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a bind; precedence follows call order
    #[must_use]
    pub fn bind(mut self, bind: impl Bind + 'static) -> Self {
        self.binds.push(Box::new(bind));
        self
    }

    /// Run a full validation walk before returning, so construction fails
    /// atomically on any missing required value or invalid bound value
    #[must_use]
    pub fn validate_on_init(mut self) -> Self {
        self.validate_on_init = true;
        self
    }
}

// =============================================================================
// Build
// =============================================================================

/// Compile a schema literal into a wired [`ConfigBound`].
///
/// Section order follows literal key order; the implicit section sits where
/// its first item appears.
///
/// # Errors
///
/// Fails on invalid names, duplicate names, malformed rules, defaults
/// rejected by their rule, and - with
/// [`validate_on_init`](BuildOptions::validate_on_init) - any validation
/// issue across the compiled tree.
pub fn build(schema: Schema, options: BuildOptions) -> Result<ConfigBound> {
    let container = ConfigBound::new(&options.name)?;
    for bind in options.binds {
        container.add_boxed_bind(bind)?;
    }

    // Pass one: compile full sections, grouping top-level items under the
    // container's own name.
    let mut compiled: Vec<Section> = Vec::new();
    let mut implicit: Option<usize> = None;
    for (key, node) in schema.nodes {
        match node {
            SchemaNode::Section(spec) => {
                compiled.push(compile_section(&key, spec)?);
            }
            SchemaNode::Item(spec) => {
                let element = compile_element(&key, spec)?;
                match implicit {
                    Some(index) => compiled[index].add_element(element)?,
                    None => {
                        compiled.push(Section::new(container.name(), vec![element])?);
                        implicit = Some(compiled.len() - 1);
                    }
                }
            }
        }
    }

    // Pass two: attach through the normal wiring path.
    for section in compiled {
        container.add_section(section)?;
    }

    if options.validate_on_init {
        container.validate()?;
    }

    info!(
        "Compiled schema into '{}' ({} section(s))",
        container.name(),
        container.section_names().len()
    );
    Ok(container)
}

fn compile_section(name: &str, spec: SectionSpec) -> Result<Section> {
    let mut elements = Vec::with_capacity(spec.properties.0.len());
    for (element_name, item) in spec.properties.0 {
        elements.push(compile_element(&element_name, item)?);
    }
    let section = Section::new(name, elements)?;
    Ok(match spec.description {
        Some(description) => section.with_description(description),
        None => section,
    })
}

fn compile_element(name: &str, spec: ItemSpec) -> Result<Element> {
    let rule = spec.rule.unwrap_or_else(Rule::any);
    rule.verify()
        .map_err(|reason| Error::Config(format!("Invalid rule for '{name}': {reason}")))?;

    let mut builder = Element::builder(name).rule(rule);
    if let Some(description) = spec.description {
        builder = builder.description(description);
    }
    if let Some(default) = spec.default {
        builder = builder.default_value(default);
    }
    if let Some(example) = spec.example {
        builder = builder.example(example);
    }
    if spec.sensitive {
        builder = builder.sensitive();
    }
    if spec.omit_from_schema {
        builder = builder.omit_from_schema();
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::MapBind;
    use serde_json::json;

    #[test]
    fn test_items_and_sections_partitioned() {
        let literal = schema! {
            "port" => ItemSpec::new().default_value(json!(3000)),
            "database" => SectionSpec::new()
                .description("Database connection")
                .property("host", ItemSpec::new().default_value(json!("localhost"))),
        };

        let config = build(literal, BuildOptions::new()).unwrap();
        assert_eq!(config.section_names(), ["app", "database"]);
        assert_eq!(config.get("app", "port").unwrap(), Some(json!(3000)));
        assert_eq!(
            config.get("database", "host").unwrap(),
            Some(json!("localhost"))
        );
        assert_eq!(
            config.section("database").unwrap().description(),
            Some("Database connection")
        );
    }

    #[test]
    fn test_container_name_names_implicit_section() {
        let literal = schema! {
            "verbose" => ItemSpec::new().default_value(json!(false)),
        };
        let config = build(literal, BuildOptions::new().name("tool")).unwrap();
        assert_eq!(config.section_names(), ["tool"]);
        assert_eq!(config.get("tool", "verbose").unwrap(), Some(json!(false)));
    }

    #[test]
    fn test_implicit_section_sits_at_first_item() {
        let literal = schema! {
            "database" => SectionSpec::new()
                .property("host", ItemSpec::new().default_value(json!("localhost"))),
            "port" => ItemSpec::new().default_value(json!(3000)),
            "verbose" => ItemSpec::new().default_value(json!(false)),
        };
        let config = build(literal, BuildOptions::new()).unwrap();
        assert_eq!(config.section_names(), ["database", "app"]);
        assert_eq!(
            config
                .section("app")
                .unwrap()
                .elements()
                .iter()
                .map(|e| e.name().to_string())
                .collect::<Vec<_>>(),
            ["port", "verbose"]
        );
    }

    #[test]
    fn test_from_value_literal() {
        let schema = Schema::from_value(&json!({
            "port": {"default": 3000, "validator": {"kind": "integer", "min": 1.0, "max": 65535.0}},
            "database": {"properties": {"host": {"default": "localhost"}}},
        }))
        .unwrap();

        let config = build(schema, BuildOptions::new()).unwrap();
        assert_eq!(config.section_names(), ["app", "database"]);
        assert_eq!(config.get("app", "port").unwrap(), Some(json!(3000)));
    }

    #[test]
    fn test_unrecognized_node_is_fatal() {
        let result = Schema::from_value(&json!({
            "port": {"default": 3000, "bogus_field": true},
        }));
        assert!(matches!(result, Err(Error::Parse(_))));

        assert!(Schema::from_value(&json!("not an object")).is_err());
    }

    #[test]
    fn test_empty_object_node_is_fatal() {
        // Matches neither shape: not a section, and an item spec needs at
        // least one field
        let result = Schema::from_value(&json!({"mystery": {}}));
        assert!(matches!(result, Err(Error::Parse(_))));

        // A one-field item and an empty-properties section both still parse
        assert!(Schema::from_value(&json!({"port": {"default": 1}})).is_ok());
        assert!(Schema::from_value(&json!({"db": {"properties": {}}})).is_ok());
    }

    #[test]
    fn test_item_spec_camel_case_fields() {
        let spec: ItemSpec = serde_json::from_value(json!({
            "default": "k",
            "sensitive": true,
            "omitFromSchema": true,
        }))
        .unwrap();
        assert!(spec.sensitive);
        assert!(spec.omit_from_schema);
    }

    #[test]
    fn test_invalid_rule_fails_build() {
        let literal = schema! {
            "ratio" => ItemSpec::new().rule(Rule::float().min(1.0).max(0.0)),
        };
        assert!(matches!(
            build(literal, BuildOptions::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_default_fails_build() {
        let literal = schema! {
            "port" => ItemSpec::new().default_value(json!("oops")).rule(Rule::integer()),
        };
        assert!(matches!(
            build(literal, BuildOptions::new()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_binds_attached_in_option_order() {
        let literal = schema! {
            "port" => ItemSpec::new().default_value(json!(3000)),
        };
        let config = build(
            literal,
            BuildOptions::new()
                .bind(MapBind::new().with("app.port", json!(1111)))
                .bind(MapBind::new().with("app.port", json!(2222))),
        )
        .unwrap();
        assert_eq!(config.get("app", "port").unwrap(), Some(json!(1111)));
    }

    #[test]
    fn test_validate_on_init_fails_atomically() {
        let literal = schema! {
            "api_key" => ItemSpec::new().rule(Rule::text().required()),
        };
        let result = build(literal, BuildOptions::new().validate_on_init());
        match result {
            Err(Error::Validation(report)) => {
                assert_eq!(report.len(), 1);
                assert_eq!(report.issues()[0].path, "app.api_key");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_schema_builds() {
        let config = build(schema! {}, BuildOptions::new()).unwrap();
        assert!(config.section_names().is_empty());
        assert!(config.validate().is_ok());
    }
}
