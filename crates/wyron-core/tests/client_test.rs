#![allow(clippy::unwrap_used)]
// End-to-end tests for `Client` over the HTTP transport using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wyron_core::{
    Client, ClientConfig, CoreError, InterfaceUpdate, ListUsersOptions, Protocol, ServerUpdate,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::http(server.uri(), "admin", SecretString::from("hunter2"))
        .with_timeout(Duration::from_secs(5))
}

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .mount(&server)
        .await;
    let client = Client::connect(config(&server)).await.unwrap();
    (server, client)
}

fn srv1() -> serde_json::Value {
    json!({
        "name": "srv-1",
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

async fn mount_srv1(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/servers/srv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": srv1() })))
        .mount(server)
        .await;
}

// ── Construction ────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_rejects_empty_credentials_without_dialing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = ClientConfig::http(server.uri(), "", SecretString::from("pw"));
    let err = Client::connect(cfg).await.unwrap_err();
    assert!(matches!(err, CoreError::Config { .. }));
}

#[tokio::test]
async fn test_connect_rejects_unknown_proxy_scheme() {
    let server = MockServer::start().await;
    let cfg = config(&server).with_proxy("ftp://proxy.example.com:21");
    let err = Client::connect(cfg).await.unwrap_err();
    assert!(matches!(err, CoreError::Config { .. }));
}

#[tokio::test]
async fn test_connect_fails_when_login_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = Client::connect(config(&server)).await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_protocol_reports_transport() {
    let (_server, client) = setup().await;
    assert_eq!(client.protocol(), Protocol::Http);
}

// ── Servers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_servers_maps_domain_types() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [srv1()] })))
        .mount(&server)
        .await;

    let servers = client.list_servers().await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].id, "srv-1");
    assert_eq!(servers[0].interfaces[0].port, Some(51820));
}

#[tokio::test]
async fn test_create_or_update_server_refetches_by_name() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/servers"))
        .and(body_json(json!({
            "name": "srv-1",
            "address": "203.0.113.10",
            "username": "root",
            "password": "ssh-pw"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "srv-1" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_srv1(&server).await;

    let request = ServerUpdate {
        id: "srv-1".into(),
        address: "203.0.113.10".into(),
        username: "root".into(),
        password: Some(SecretString::from("ssh-pw")),
        display_name: None,
    };
    let stored = client.create_or_update_server(&request).await.unwrap();
    assert_eq!(stored.address, "203.0.113.10");
    assert_eq!(stored.interfaces.len(), 1);
}

#[tokio::test]
async fn test_update_interface_returns_stored_interface() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/servers/srv-1/interfaces"))
        .and(body_json(json!({ "name": "wg0", "endpoint": "vpn.example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    mount_srv1(&server).await;

    let request = InterfaceUpdate {
        server_id: "srv-1".into(),
        name: "wg0".into(),
        endpoint: Some("vpn.example.com".into()),
        ..InterfaceUpdate::default()
    };
    let iface = client.update_interface(&request).await.unwrap();
    assert_eq!(iface.public_key.as_deref(), Some("PUB"));
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_users_over_http_has_no_total() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "user_key": "u1", "social_id": 0, "created_at": 0 }]
        })))
        .mount(&server)
        .await;

    let page = client.list_users(&ListUsersOptions::default()).await.unwrap();
    assert_eq!(page.total, None);
    assert_eq!(page.users[0].social_id, None);
    assert_eq!(page.users[0].created_at, None);
}

#[tokio::test]
async fn test_rpc_only_operations_are_unsupported_over_http() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/users/u1/revoke-sub-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        client.revoke_sub_token("u1").await,
        Err(CoreError::Unsupported { .. })
    ));
    assert!(matches!(
        client
            .create_admin("ops", &SecretString::from("pw"))
            .await,
        Err(CoreError::Unsupported { .. })
    ));
}

#[tokio::test]
async fn test_me_reads_username() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "admin" })))
        .mount(&server)
        .await;

    assert_eq!(client.me().await.unwrap().username, "admin");
}

#[tokio::test]
async fn test_metrics_read_the_result_envelope() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "total_users": 4, "active_users": 3, "disabled_users": 1, "total_usage": 512 }
        })))
        .mount(&server)
        .await;

    let metrics = client.metrics().await.unwrap();
    assert_eq!(metrics.total_users, 4);
    assert_eq!(metrics.total_usage, 512);
}

#[tokio::test]
async fn test_malformed_metrics_are_an_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let err = client.metrics().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Api(wyron_api::Error::Deserialization { .. })
    ));
}

// ── Peer configuration ──────────────────────────────────────────────

#[tokio::test]
async fn test_peer_config_end_to_end() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "user_key": "u1",
                "active": true,
                "peers": [{
                    "server_id": "srv-1",
                    "interface": "wg0",
                    "allowed_address": "10.8.0.2/32",
                    "private_key": "SK"
                }]
            }
        })))
        .mount(&server)
        .await;
    mount_srv1(&server).await;

    let user = client.get_user("u1").await.unwrap().unwrap();
    let text = client.peer_config(&user.peers[0]).await.unwrap();
    assert_eq!(
        text,
        "[Interface]\n\
         Address = 10.8.0.2/32\n\
         DNS = 1.1.1.1\n\
         PrivateKey = SK\n\
         \n\
         [Peer]\n\
         AllowedIPs = 0.0.0.0/0\n\
         Endpoint = vpn.example.com:51820\n\
         PublicKey = PUB\n"
    );
}

#[tokio::test]
async fn test_peer_config_for_unknown_server() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/servers/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let peer = wyron_core::Peer::new("gone", "wg0", "10.8.0.2/32").with_private_key("SK");
    let err = client.peer_config(&peer).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_peer_without_key_never_fetches_server() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/servers/srv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": srv1() })))
        .expect(0)
        .mount(&server)
        .await;

    let peer = wyron_core::Peer::new("srv-1", "wg0", "10.8.0.2/32");
    assert!(matches!(
        client.peer_config(&peer).await,
        Err(CoreError::MissingPrivateKey)
    ));
}

// ── Shared session ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clones_share_one_relogin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "tok-2" }))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = Client::connect(config(&server)).await.unwrap();
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.list_servers().await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_empty());
    }

    let logins = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/auth/login")
        .count();
    assert_eq!(logins, 2);
}
