#![allow(clippy::unwrap_used)]
// Integration tests for `HttpClient` using wiremock.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wyron_api::{CallContext, Credentials, Error, HttpClient, ListUsersOptions, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials::new("admin", SecretString::from("hunter2")).unwrap()
}

fn transport() -> TransportConfig {
    TransportConfig::new(Duration::from_secs(5), None).unwrap()
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, HttpClient) {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1").await;
    let client = HttpClient::connect(&server.uri(), credentials(), &transport())
        .await
        .unwrap();
    (server, client)
}

fn server_json(id: &str) -> serde_json::Value {
    json!({
        "name": id,
        "address": "203.0.113.10",
        "username": "root",
        "interfaces": [{
            "name": "wg0",
            "endpoint": "vpn.example.com",
            "port": 51820,
            "public_key": "PUB",
            "dns": "1.1.1.1"
        }]
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_connect_logs_in_and_stores_token() {
    let (_server, client) = setup().await;
    assert_eq!(client.token().await.unwrap().expose_secret(), "tok-1");
    assert!(client.base_url().as_str().ends_with("/api/"));
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = HttpClient::connect(&server.uri(), credentials(), &transport()).await;
    match result {
        Err(Error::Authentication { message }) => assert!(message.contains("403")),
        Err(other) => panic!("expected Authentication error, got: {other:?}"),
        Ok(_) => panic!("expected Authentication error"),
    }
}

#[tokio::test]
async fn test_login_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = HttpClient::connect(&server.uri(), credentials(), &transport()).await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "admin" })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client.me().await.unwrap();
    assert_eq!(me["username"], "admin");
}

#[tokio::test]
async fn test_expired_token_triggers_single_relogin_and_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-2" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [server_json("srv-1")] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::connect(&server.uri(), credentials(), &transport())
        .await
        .unwrap();
    let servers = client.list_servers().await.unwrap();

    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].name, "srv-1");
    assert_eq!(client.token().await.unwrap().expose_secret(), "tok-2");
}

#[tokio::test]
async fn test_second_unauthorized_is_returned_without_another_retry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(2)
        .mount(&server)
        .await;

    let err = client.list_servers().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.delete_user("ghost").await.unwrap_err();
    match err {
        Error::Api {
            method,
            path,
            status,
            body,
        } => {
            assert_eq!(method, "DELETE");
            assert_eq!(path, "/api/users/ghost");
            assert_eq!(status, 404);
            assert_eq!(body, "no such user");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }

    let logins = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/auth/login")
        .count();
    assert_eq!(logins, 1);
}

// ── Server tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_server_null_data_is_absent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    assert!(client.get_server("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_server_parses_interfaces() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers/srv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": server_json("srv-1") })))
        .mount(&server)
        .await;

    let found = client.get_server("srv-1").await.unwrap().unwrap();
    let interfaces = found.interfaces.unwrap();
    assert_eq!(interfaces[0].name, "wg0");
    assert_eq!(interfaces[0].port, Some(51820));
}

#[tokio::test]
async fn test_delete_interface_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/servers/srv-1/interfaces/wg0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client.delete_interface("srv-1", "wg0").await.unwrap();
    assert_eq!(reply["ok"], true);
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/servers/srv-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(client.delete_server("srv-1").await.unwrap().is_null());
}

// ── User tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_users_sends_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("limit", "50"))
        .and(query_param("skip", "0"))
        .and(query_param("sort", "created_at"))
        .and(query_param("order", "desc"))
        .and(query_param_is_missing("social_id"))
        .and(query_param_is_missing("status"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "user_key": "u1", "active": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client.list_users(&ListUsersOptions::default()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_key, "u1");
}

#[tokio::test]
async fn test_list_users_sends_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("social_id", "99"))
        .and(query_param("search", "alice"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ListUsersOptions {
        social_id: Some(99),
        search: Some("alice".into()),
        limit: Some(5),
        ..ListUsersOptions::default()
    };
    assert!(client.list_users(&options).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_user_uses_patch() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/u1"))
        .and(body_json(json!({ "traffic_limit": 1024 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "user_key": "u1", "traffic_limit": 1024 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .edit_user("u1", &json!({ "traffic_limit": 1024 }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.traffic_limit, Some(1024));
}

#[tokio::test]
async fn test_user_actions_post_to_subpaths() {
    let (server, client) = setup().await;

    for action in ["enable", "disable", "reset-usage"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/users/u1/{action}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.enable_user("u1").await.unwrap();
    client.disable_user("u1").await.unwrap();
    client.reset_usage("u1").await.unwrap();
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.metrics().await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_auth_expired());
}

// ── Call context tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_deadline_bounds_slow_responses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let scoped = client.with_context(CallContext::new().with_timeout(Duration::from_millis(100)));
    let err = scoped.list_servers().await.unwrap_err();
    assert!(err.is_transient(), "expected a timeout, got: {err:?}");
}

#[tokio::test]
async fn test_cancelled_context_skips_the_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let scoped = client.with_context(CallContext::new().with_cancellation(token));
    assert!(scoped.list_servers().await.unwrap_err().is_cancelled());
}
