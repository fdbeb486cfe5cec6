/*!
 * Shared Test Helpers
 *
 * Builds a full application over the in-memory store with a capturing
 * mailer, so tests can drive the real HTTP surface (including the emailed
 * verification link) without external services.
 */

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;

use palaver::auth::{
    AuthBridge, IdentityProvider, LocalIdentity, VerificationMailer,
};
use palaver::categories::CategoryService;
use palaver::error::AuthError;
use palaver::messages::MessageService;
use palaver::profiles::ProfileService;
use palaver::routes::create_router;
use palaver::server::{AppState, Config};
use palaver::stats::StatsService;
use palaver::store::{DocumentStore, MemoryStore};
use palaver::threads::ThreadService;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_BASE_URL: &str = "http://test.local";

/// Mailer that records every (recipient, link) pair instead of sending.
#[derive(Default)]
pub struct CaptureMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl CaptureMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Token embedded in the most recent captured link.
    pub fn last_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, link)| link.split("token=").nth(1))
            .map(str::to_string)
    }
}

#[async_trait]
impl VerificationMailer for CaptureMailer {
    async fn send(&self, to: &str, link: &str) -> Result<(), AuthError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<CaptureMailer>,
    pub state: AppState,
}

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        session_secret: TEST_SECRET.to_string(),
        cookie_secure: false,
        public_base_url: TEST_BASE_URL.to_string(),
        smtp: None,
    }
}

/// Spin up the full router over a fresh in-memory store. Cookies persist
/// across requests, so a register/login carries into later calls.
pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    let mailer = Arc::new(CaptureMailer::default());

    let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentity::new(
        dyn_store.clone(),
        mailer.clone(),
        TEST_SECRET.to_string(),
        TEST_BASE_URL.to_string(),
    ));

    let categories = CategoryService::new(dyn_store.clone());
    let threads = ThreadService::new(dyn_store.clone());
    let messages = MessageService::new(dyn_store.clone());
    let profiles = ProfileService::new(dyn_store.clone());
    let stats = StatsService::new(categories.clone(), threads.clone(), messages.clone());
    let bridge = Arc::new(AuthBridge::new(identity.clone(), profiles.clone()));

    let state = AppState {
        config: Arc::new(test_config()),
        store: dyn_store,
        identity,
        bridge,
        categories,
        threads,
        messages,
        profiles,
        stats,
    };

    let server = TestServer::builder()
        .save_cookies()
        .build(create_router(state.clone()))
        .expect("failed to build test server");

    TestApp {
        server,
        store,
        mailer,
        state,
    }
}

impl TestApp {
    /// Register an account and leave its session cookie on the server.
    pub async fn register(&self, email: &str, password: &str, username: &str) {
        let response = self
            .server
            .post("/register")
            .json(&json!({
                "email": email,
                "password": password,
                "username": username,
            }))
            .await;
        assert_eq!(response.status_code(), 201, "register failed: {}", response.text());
    }
}
