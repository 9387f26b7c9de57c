//! Test helpers: build AppState and router with in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p stillcast-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use stillcast_api::setup::routes;
use stillcast_api::AppState;
use stillcast_core::{CompositionConfig, Config};
use stillcast_processing::test_helpers::{MockStorage, ScriptedEncoder};
use tempfile::TempDir;

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<MockStorage>,
    pub encoder: Arc<ScriptedEncoder>,
    pub scratch: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left under the scratch root.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path())
            .expect("Failed to read scratch root")
            .count()
    }
}

pub fn test_config(scratch: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("SCRATCH_DIR".to_string(), scratch.display().to_string());
    vars.insert("ENCODER_QUEUE_TIMEOUT_SECS".to_string(), "1".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = CompositionConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test config");
    Config(Box::new(config))
}

/// App with both inputs present and a succeeding encoder.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(MockStorage::with_inputs(), ScriptedEncoder::succeeding(), &[])
}

pub fn setup_test_app_with(
    storage: MockStorage,
    encoder: ScriptedEncoder,
    overrides: &[(&str, &str)],
) -> TestApp {
    let scratch = tempfile::tempdir().expect("Failed to create scratch root");
    let config = test_config(scratch.path(), overrides);

    let storage = Arc::new(storage);
    let encoder = Arc::new(encoder);
    let state = Arc::new(AppState::new(config.clone(), storage.clone(), encoder.clone()));

    let app = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
        encoder,
        scratch,
    }
}

pub fn compose_body(image: &str, audio: &str, output: &str) -> Value {
    json!({ "image": image, "audio": audio, "output": output })
}
