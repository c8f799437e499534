//! Test helpers: build AppState and router with in-process fakes.
//!
//! Run from workspace root: `cargo test -p reelpost-api`.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use reelpost_api::setup::{build_app, ServiceDeps};
use reelpost_api::state::AppState;
use reelpost_core::models::CredentialRecord;
use reelpost_core::Config;
use reelpost_services::{CredentialStore, InMemoryCredentialStore};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

use fakes::{FakeDecoder, FakePlatform, FakeProvider};

pub const TEST_SECRET_KEY: &str = "test-secret-key-at-least-32-characters-long";
pub const TEST_REDIRECT_URI: &str = "http://localhost:5000/auth/callback";

/// Test application: server, state and the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub platform: Arc<FakePlatform>,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub struct TestOptions {
    pub signed_in: bool,
    pub platform: FakePlatform,
    pub decoder: FakeDecoder,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            signed_in: true,
            platform: FakePlatform::default(),
            decoder: FakeDecoder::with_frames(100, Some(10.0)),
        }
    }
}

pub fn test_credential() -> CredentialRecord {
    CredentialRecord {
        token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        scopes: None,
        expiry: None,
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    let root = temp_dir.path();
    let vars: HashMap<String, String> = [
        ("SECRET_KEY", TEST_SECRET_KEY.to_string()),
        ("REDIRECT_URI", TEST_REDIRECT_URI.to_string()),
        ("UPLOAD_DIR", root.join("uploads").display().to_string()),
        ("TOKEN_FILE", root.join("token.json").display().to_string()),
        ("CLIENT_SECRETS_DIR", root.display().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    Config::from_lookup(move |key| vars.get(key).cloned()).expect("Failed to build test config")
}

/// Signed-in app with default fakes.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);

    let credentials = Arc::new(if options.signed_in {
        InMemoryCredentialStore::with_record(test_credential())
    } else {
        InMemoryCredentialStore::new()
    });
    let platform = Arc::new(options.platform);

    let deps = ServiceDeps {
        identity: Arc::new(FakeProvider::default()),
        credentials: credentials.clone() as Arc<dyn CredentialStore>,
        platform: platform.clone(),
        decoder: Arc::new(options.decoder),
    };

    let (state, router) = build_app(config, deps)
        .await
        .expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        platform,
        credentials,
        _temp_dir: temp_dir,
    }
}
