mod common;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use common::{assert_redirect, login_ok, send, TestHarness};

const GATED_PAGES: &[&str] = &["/chat", "/search"];

const GATED_API: &[&str] = &[
    "/api/chat/update",
    "/api/chat/send-message",
    "/api/search/username/alice",
    "/api/search/message/hello",
];

// ===========================================================================
// Not logged in
// ===========================================================================

#[tokio::test]
async fn pages_redirect_home_without_login() {
    let harness = TestHarness::new();
    let client = harness.client();

    for path in GATED_PAGES {
        let resp = client.get(path).await;
        assert_redirect(&resp, "/");
    }
}

#[tokio::test]
async fn api_answers_unauthorized_without_login() {
    let harness = TestHarness::new();
    let client = harness.client();

    for path in GATED_API {
        let resp = client.get(path).await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(resp.header(LOCATION), "/", "{path}");
        let body: serde_json::Value = resp.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn posting_without_login_never_reaches_the_store() {
    let harness = TestHarness::new();
    let client = harness.client();

    let resp = send(&client, "alice", "hello").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let peer = harness.client();
    login_ok(&peer, "bob").await;
    let update = common::update(&peer).await;
    assert!(update["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_login_does_not_open_the_gate() {
    let harness = TestHarness::new();
    let owner = harness.client();
    let client = harness.client();
    login_ok(&owner, "alice").await;

    common::login(&client, "alice").await.assert_status_ok();

    client
        .get("/api/chat/update")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ===========================================================================
// Logged in
// ===========================================================================

#[tokio::test]
async fn pages_open_after_login() {
    let harness = TestHarness::new();
    let client = harness.client();
    login_ok(&client, "alice").await;

    for path in GATED_PAGES {
        client.get(path).await.assert_status_ok();
    }
}

#[tokio::test]
async fn send_message_by_get_is_a_bad_request() {
    let harness = TestHarness::new();
    let client = harness.client();
    login_ok(&client, "alice").await;

    let resp = client.get("/api/chat/send-message").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["message"], "This function requires a post request.");
}

#[tokio::test]
async fn logout_closes_the_gate() {
    let harness = TestHarness::new();
    let client = harness.client();
    login_ok(&client, "alice").await;

    assert_redirect(&client.get("/chat/logout").await, "/");

    assert_redirect(&client.get("/chat").await, "/");
    client
        .get("/api/chat/update")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ===========================================================================
// Restart
// ===========================================================================

#[tokio::test]
async fn login_from_before_restart_is_invalid() {
    let harness = TestHarness::new();
    let client = harness.client();
    let resp = login_ok(&client, "alice").await;
    let cookie = resp.cookie(harness.cookie_name());
    client.get("/chat").await.assert_status_ok();

    let restarted = harness.restart().await;
    let mut returning = restarted.client();
    returning.add_cookie(cookie);

    assert_redirect(&returning.get("/chat").await, "/");
    let api = returning.get("/api/chat/update").await;
    api.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(api.header(LOCATION), "/");

    // Home shows the form instead of bouncing to /chat.
    returning.get("/").await.assert_status_ok();
}

#[tokio::test]
async fn names_are_free_again_after_restart() {
    let harness = TestHarness::new();
    let client = harness.client();
    login_ok(&client, "alice").await;
    send(&client, "alice", "before the restart").await.assert_status_ok();

    let restarted = harness.restart().await;
    assert!(restarted.bound_names().await.is_empty());

    let newcomer = restarted.client();
    login_ok(&newcomer, "alice").await;

    let update = common::update(&newcomer).await;
    assert_eq!(common::user_names(&update), vec!["alice"]);
    assert_eq!(common::texts(&update["messages"]), vec!["before the restart"]);
}

#[tokio::test]
async fn returning_session_can_log_in_again_after_restart() {
    let harness = TestHarness::new();
    let client = harness.client();
    let cookie = login_ok(&client, "alice")
        .await
        .cookie(harness.cookie_name());

    let restarted = harness.restart().await;
    let mut returning = restarted.client();
    returning.add_cookie(cookie);

    login_ok(&returning, "alice").await;
    returning.get("/chat").await.assert_status_ok();
    send(&returning, "alice", "back again").await.assert_status_ok();
}
