//! Read-only schema projections
//!
//! Generates documentation views of a wired container: a markdown reference
//! and a JSON (optionally YAML) schema dump. Projections honor the
//! `omit_from_schema` flag and mask sensitive values; they never mutate the
//! tree.

use crate::container::ConfigBound;
use crate::element::Element;
use serde_json::{Value, json};

/// Replacement shown for sensitive defaults, examples and values
pub const MASK: &str = "********";

/// Configuration for schema export
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Title for the markdown reference
    pub title: Option<String>,
    /// Introduction text
    pub description: Option<String>,
    /// Include elements flagged `omit_from_schema`
    pub include_hidden: bool,
    /// Include the currently resolved value of each element
    pub include_values: bool,
}

impl ExportConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn include_hidden(mut self) -> Self {
        self.include_hidden = true;
        self
    }

    #[must_use]
    pub fn with_values(mut self) -> Self {
        self.include_values = true;
        self
    }
}

/// Generate a markdown reference for every exported section and element
#[must_use]
pub fn markdown(container: &ConfigBound, config: ExportConfig) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    let title = config
        .title
        .clone()
        .unwrap_or_else(|| format!("{} Configuration Reference", container.name()));
    writeln!(output, "# {title}\n").unwrap();

    if let Some(ref description) = config.description {
        writeln!(output, "{description}\n").unwrap();
    }

    for section in container.sections() {
        writeln!(output, "## {}\n", section.name()).unwrap();
        if let Some(description) = section.description() {
            writeln!(output, "{description}\n").unwrap();
        }

        for element in section.elements() {
            if element.omitted_from_schema() && !config.include_hidden {
                continue;
            }

            writeln!(output, "### `{}.{}`\n", section.name(), element.name()).unwrap();
            if let Some(description) = element.description() {
                writeln!(output, "{description}\n").unwrap();
            }
            if element.is_required() {
                writeln!(output, "- Required: yes").unwrap();
            }
            if let Some(default) = masked(element, element.default_value()) {
                writeln!(output, "- Default: `{default}`").unwrap();
            }
            if let Some(example) = masked(element, element.example()) {
                writeln!(output, "- Example: `{example}`").unwrap();
            }
            if config.include_values {
                if let Some(value) = masked(element, current_value(container, element).as_ref()) {
                    writeln!(output, "- Current value: `{value}`").unwrap();
                }
            }
            writeln!(output).unwrap();
        }
    }

    output
}

/// Project the schema (and optionally current values) into a JSON document
#[must_use]
pub fn json_schema(container: &ConfigBound, config: ExportConfig) -> Value {
    let sections: Vec<Value> = container
        .sections()
        .iter()
        .map(|section| {
            let elements: Vec<Value> = section
                .elements()
                .iter()
                .filter(|e| config.include_hidden || !e.omitted_from_schema())
                .map(|element| {
                    let mut fields = serde_json::Map::new();
                    fields.insert("name".into(), json!(element.name()));
                    fields.insert("sensitive".into(), json!(element.is_sensitive()));
                    fields.insert("required".into(), json!(element.is_required()));
                    if let Some(description) = element.description() {
                        fields.insert("description".into(), json!(description));
                    }
                    if let Some(default) = masked(element, element.default_value()) {
                        fields.insert("default".into(), default);
                    }
                    if let Some(example) = masked(element, element.example()) {
                        fields.insert("example".into(), example);
                    }
                    if config.include_values {
                        if let Some(value) =
                            masked(element, current_value(container, element).as_ref())
                        {
                            fields.insert("value".into(), value);
                        }
                    }
                    Value::Object(fields)
                })
                .collect();

            json!({
                "name": section.name(),
                "description": section.description(),
                "elements": elements,
            })
        })
        .collect();

    json!({
        "name": container.name(),
        "sections": sections,
    })
}

/// Project the schema into a YAML document
///
/// # Errors
///
/// Returns [`crate::Error::Parse`] if the projection cannot be serialized.
#[cfg(feature = "yaml")]
pub fn yaml_schema(
    container: &ConfigBound,
    config: ExportConfig,
) -> crate::error::Result<String> {
    serde_yaml::to_string(&json_schema(container, config))
        .map_err(|e| crate::error::Error::Parse(e.to_string()))
}

/// Resolved value for export purposes; resolution faults are projected as
/// "no value" rather than aborting the export.
fn current_value(container: &ConfigBound, element: &Element) -> Option<Value> {
    element
        .section()
        .and_then(|section| container.get(section, element.name()).ok())
        .flatten()
}

fn masked(element: &Element, value: Option<&Value>) -> Option<Value> {
    value.map(|v| {
        if element.is_sensitive() {
            json!(MASK)
        } else {
            v.clone()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::MapBind;
    use crate::schema::{self, BuildOptions, ItemSpec, SectionSpec};
    use crate::validate::Rule;
    use serde_json::json;

    fn sample() -> ConfigBound {
        let literal = crate::schema! {
            "port" => ItemSpec::new()
                .description("TCP listen port")
                .default_value(json!(3000))
                .rule(Rule::integer().min(1.0).max(65535.0)),
            "api_key" => ItemSpec::new()
                .sensitive()
                .default_value(json!("topsecret"))
                .rule(Rule::text().required()),
            "internal_flag" => ItemSpec::new()
                .omit_from_schema()
                .default_value(json!(false)),
            "database" => SectionSpec::new()
                .description("Database connection")
                .property("host", ItemSpec::new().default_value(json!("localhost"))),
        };
        schema::build(
            literal,
            BuildOptions::new().bind(MapBind::new().with("app.port", json!(8080))),
        )
        .unwrap()
    }

    #[test]
    fn test_markdown_masks_sensitive_defaults() {
        let output = markdown(&sample(), ExportConfig::new());
        assert!(output.contains("# app Configuration Reference"));
        assert!(output.contains("### `app.api_key`"));
        assert!(output.contains(MASK));
        assert!(!output.contains("topsecret"));
    }

    #[test]
    fn test_markdown_skips_omitted_unless_hidden_included() {
        let config = sample();
        let output = markdown(&config, ExportConfig::new());
        assert!(!output.contains("internal_flag"));

        let with_hidden = markdown(&config, ExportConfig::new().include_hidden());
        assert!(with_hidden.contains("internal_flag"));
    }

    #[test]
    fn test_json_schema_shape() {
        let doc = json_schema(&sample(), ExportConfig::new());
        assert_eq!(doc["name"], json!("app"));
        let sections = doc["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["name"], json!("app"));
        assert_eq!(sections[1]["name"], json!("database"));

        let app_elements = sections[0]["elements"].as_array().unwrap();
        // internal_flag omitted
        assert_eq!(app_elements.len(), 2);
        assert_eq!(app_elements[1]["default"], json!(MASK));
        assert_eq!(app_elements[1]["required"], json!(true));
    }

    #[test]
    fn test_values_included_and_masked() {
        let doc = json_schema(&sample(), ExportConfig::new().with_values());
        let app_elements = doc["sections"][0]["elements"].as_array().unwrap();
        // Bind-supplied current value for port
        assert_eq!(app_elements[0]["value"], json!(8080));
        // Sensitive current value masked
        assert_eq!(app_elements[1]["value"], json!(MASK));
    }
}
