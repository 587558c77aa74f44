//! Shared fixtures for integration tests

use confbind::bind::EnvSource;
use std::collections::HashMap;
use std::sync::Arc;

/// Install the test logger; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Map-backed environment, so tests never touch process-global state
pub struct FakeEnv(HashMap<String, String>);

impl FakeEnv {
    pub fn new(vars: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }
}

impl EnvSource for FakeEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
