#![allow(dead_code)]

pub mod pg;

use std::sync::Arc;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::Router;
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Utc};
use tower_sessions::MemoryStore;

use chat_api::auth::validity::SessionValidity;
use chat_api::config::Config;
use chat_api::db::identities::{IdentityStore, MemoryIdentityStore};
use chat_api::db::messages::MemoryMessageStore;
use chat_api::views::Views;
use chat_api::AppState;
use chatroom_common::SnowflakeGenerator;

/// One "deployment" of the service over in-memory stores.
///
/// The session store and message log are shared across [`TestHarness::restart`];
/// the identity store is not, mirroring a real restart.
pub struct TestHarness {
    pub identities: Arc<MemoryIdentityStore>,
    pub messages: Arc<MemoryMessageStore>,
    pub sessions: MemoryStore,
    pub config: Arc<Config>,
    pub started_at: DateTime<Utc>,
    pub app: Router,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(
            Arc::new(MemoryMessageStore::new()),
            MemoryStore::default(),
            Utc::now(),
        )
    }

    fn build(
        messages: Arc<MemoryMessageStore>,
        sessions: MemoryStore,
        started_at: DateTime<Utc>,
    ) -> Self {
        let identities = Arc::new(MemoryIdentityStore::new());
        let config = Arc::new(Config::default());

        let state = AppState {
            identities: identities.clone(),
            messages: messages.clone(),
            validity: SessionValidity::new(started_at),
            snowflake: Arc::new(SnowflakeGenerator::new(0)),
            views: Arc::new(Views::new().expect("templates")),
            config: config.clone(),
        };
        let app = chat_api::app(state, sessions.clone());

        Self {
            identities,
            messages,
            sessions,
            config,
            started_at,
            app,
        }
    }

    /// Simulate a process restart: fresh identity store, new watermark,
    /// same transport sessions and message log.
    ///
    /// Every login stamped before the call is strictly older than the new
    /// watermark.
    pub async fn restart(&self) -> Self {
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        Self::build(self.messages.clone(), self.sessions.clone(), Utc::now())
    }

    /// A browser-like client with its own cookie jar.
    pub fn client(&self) -> TestServer {
        let mut server = TestServer::new(self.app.clone()).expect("test server");
        server.save_cookies();
        server
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.session_cookie_name
    }

    /// Names currently bound, sorted.
    pub async fn bound_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .identities
            .list()
            .await
            .expect("list identities")
            .into_iter()
            .map(|identity| identity.name)
            .collect();
        names.sort();
        names
    }
}

/// Submit the login form as `name`.
pub async fn login(client: &TestServer, name: &str) -> TestResponse {
    client.post("/login").form(&[("name", name)]).await
}

/// Log in as `name` and assert the login was accepted.
pub async fn login_ok(client: &TestServer, name: &str) -> TestResponse {
    let resp = login(client, name).await;
    assert_redirect(&resp, "/chat");
    resp
}

pub async fn send(client: &TestServer, user: &str, text: &str) -> TestResponse {
    client
        .post("/api/chat/send-message")
        .json(&serde_json::json!({ "user": user, "text": text }))
        .await
}

pub async fn update(client: &TestServer) -> serde_json::Value {
    let resp = client.get("/api/chat/update").await;
    resp.assert_status_ok();
    resp.json()
}

pub fn assert_redirect(resp: &TestResponse, to: &str) {
    resp.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(resp.header(LOCATION), to);
}

/// Message texts from an update or search body, in response order.
pub fn texts(messages: &serde_json::Value) -> Vec<String> {
    messages
        .as_array()
        .expect("array of messages")
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_string())
        .collect()
}

pub fn user_names(update: &serde_json::Value) -> Vec<String> {
    let mut names: Vec<String> = update["users"]
        .as_array()
        .expect("users array")
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}
