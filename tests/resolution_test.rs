//! Resolution Precedence Integration Tests
//!
//! End-to-end coverage of the value-resolution pipeline:
//! - Default fallback when no bind answers
//! - First-match-wins bind precedence in attachment order
//! - Invalid bind values as immediate faults
//! - Unset vs not-found error kinds
//! - Idempotent lookups and concurrent reads

mod common;

use common::FakeEnv;
use confbind::bind::{EnvBind, MapBind};
use confbind::{ConfigBound, Element, Error, Rule, Section};
use serde_json::json;
use std::thread;

fn app_section() -> Section {
    common::init_logging();
    Section::new(
        "app",
        vec![
            Element::builder("port")
                .default_value(json!(3000))
                .rule(Rule::integer().min(1.0).max(65535.0))
                .build()
                .unwrap(),
            Element::builder("api_key")
                .rule(Rule::text().required())
                .build()
                .unwrap(),
        ],
    )
    .unwrap()
}

// =============================================================================
// Defaults and Precedence
// =============================================================================

#[test]
fn test_default_used_with_no_bind_attached() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();

    assert_eq!(config.get("app", "port").unwrap(), Some(json!(3000)));
}

#[test]
fn test_env_bind_overrides_default_with_coercion() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(
            EnvBind::builder()
                .prefix("APP")
                .source(FakeEnv::new(&[("APP_APP_PORT", "8080")]))
                .build()
                .unwrap(),
        )
        .unwrap();

    // Coerced from the string source to an integer before validation
    assert_eq!(config.get("app", "port").unwrap(), Some(json!(8080)));
}

#[test]
fn test_attachment_order_beats_specificity() {
    // Two binds in order [file-ish layer, env layer]; the first layer has no
    // value for database.host, the second does.
    let config = ConfigBound::new("app").unwrap();
    config
        .add_section(
            Section::new(
                "database",
                vec![Element::builder("host").build().unwrap()],
            )
            .unwrap(),
        )
        .unwrap();

    config.add_bind(MapBind::new()).unwrap();
    config
        .add_bind(
            EnvBind::builder()
                .source(FakeEnv::new(&[("DATABASE_HOST", "db.example.com")]))
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(
        config.get("database", "host").unwrap(),
        Some(json!("db.example.com"))
    );

    // Now give the first bind a value: it wins regardless of the second
    let config = ConfigBound::new("app").unwrap();
    config
        .add_section(
            Section::new(
                "database",
                vec![Element::builder("host").build().unwrap()],
            )
            .unwrap(),
        )
        .unwrap();
    config
        .add_bind(MapBind::new().with("database.host", json!("from-first")))
        .unwrap();
    config
        .add_bind(
            EnvBind::builder()
                .source(FakeEnv::new(&[("DATABASE_HOST", "db.example.com")]))
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(
        config.get("database", "host").unwrap(),
        Some(json!("from-first"))
    );
}

// =============================================================================
// Invalid Values
// =============================================================================

#[test]
fn test_invalid_env_value_faults_with_path() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(
            EnvBind::builder()
                .prefix("APP")
                .source(FakeEnv::new(&[("APP_APP_PORT", "notanumber")]))
                .build()
                .unwrap(),
        )
        .unwrap();

    match config.get("app", "port") {
        Err(Error::InvalidValue { path, .. }) => assert_eq!(path, "app.port"),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_invalid_value_never_downgraded_to_default() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(MapBind::new().with("app.port", json!(-1)))
        .unwrap();

    // Even though a perfectly good default exists
    assert!(config.get("app", "port").is_err());
}

// =============================================================================
// Unset vs Not Found
// =============================================================================

#[test]
fn test_no_default_no_bind_is_unset() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();

    assert_eq!(config.get("app", "api_key").unwrap(), None);

    let err = config.get_or_fail("app", "api_key").unwrap_err();
    assert!(matches!(err, Error::Unset(_)));
    assert!(err.is_not_found());
}

#[test]
fn test_unknown_names_are_schema_mismatches() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();

    assert!(matches!(
        config.get("missing_section", "port"),
        Err(Error::SectionNotFound(_))
    ));
    assert!(matches!(
        config.get("app", "missing_element"),
        Err(Error::ElementNotFound(_))
    ));
}

// =============================================================================
// Boundary Behaviors
// =============================================================================

#[test]
fn test_bind_returning_unset_for_everything_is_valid() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config.add_bind(MapBind::new()).unwrap();

    // Falls through entirely to defaults
    assert_eq!(config.get("app", "port").unwrap(), Some(json!(3000)));
}

#[test]
fn test_lookups_are_idempotent() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(MapBind::new().with("app.port", json!(9000)))
        .unwrap();

    for _ in 0..3 {
        assert_eq!(config.get("app", "port").unwrap(), Some(json!(9000)));
    }
}

#[test]
fn test_concurrent_reads_are_safe() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(MapBind::new().with("app.port", json!(9000)))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(config.get("app", "port").unwrap(), Some(json!(9000)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_typed_access() {
    let config = ConfigBound::new("app").unwrap();
    config.add_section(app_section()).unwrap();
    config
        .add_bind(MapBind::new().with("app.api_key", json!("k-123")))
        .unwrap();

    let port: u16 = config.get_as("app", "port").unwrap();
    let key: String = config.get_as("app", "api_key").unwrap();
    assert_eq!(port, 3000);
    assert_eq!(key, "k-123");
}
