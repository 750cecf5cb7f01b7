// HTTP API wire types
//
// Servers come wrapped as `{ "data": ... }`, users as `{ "result": ... }`.
// Fields use `#[serde(default)]` liberally because the service omits
// zero values instead of sending them.

use serde::{Deserialize, Serialize};

/// `{ "data": T }` envelope used by the server endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// `{ "result": T }` envelope used by the user endpoints.
#[derive(Debug, Deserialize)]
pub struct ResultEnvelope<T> {
    pub result: Option<T>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// A WireGuard interface as the HTTP API reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireGuardInterface {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// A managed server. Its identifier travels in the `name` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub interfaces: Option<Vec<WireGuardInterface>>,
}

/// A peer slot held by a user on one server interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerState {
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub allowed_address: String,
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub user_key: String,
    #[serde(default)]
    pub sub_token: String,
    #[serde(default)]
    pub social_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub traffic_limit: Option<i64>,
    #[serde(default)]
    pub usage: Option<i64>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub first_connected_at: Option<i64>,
    #[serde(default)]
    pub last_connected_at: Option<i64>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub peers: Option<Vec<PeerState>>,
}
