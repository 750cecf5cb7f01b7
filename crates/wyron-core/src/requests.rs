// ── Typed request payloads ──
//
// One struct per mutation, shared by both transports: serialized as JSON
// for HTTP, converted into the matching protobuf message for RPC.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use wyron_api::rpc::proto;

fn expose<S: Serializer>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

// ── Servers ────────────────────────────────────────────────────────

/// Create a server, or update it when `id` already exists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerUpdate {
    /// Sent as `name` over HTTP.
    #[serde(rename = "name")]
    pub id: String,
    pub address: String,
    pub username: String,
    /// SSH password used by the service to provision the host.
    #[serde(serialize_with = "expose", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<&ServerUpdate> for proto::UpdateServerRequest {
    fn from(req: &ServerUpdate) -> Self {
        Self {
            id: req.id.clone(),
            address: req.address.clone(),
            username: req.username.clone(),
            password: req
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default(),
            display_name: req.display_name.clone().unwrap_or_default(),
        }
    }
}

/// Create or update one interface on a server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceUpdate {
    /// Path parameter over HTTP, field over RPC.
    #[serde(skip)]
    pub server_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
}

impl From<&InterfaceUpdate> for proto::InterfaceRequest {
    fn from(req: &InterfaceUpdate) -> Self {
        Self {
            server_id: req.server_id.clone(),
            name: req.name.clone(),
            display_name: req.display_name.clone().unwrap_or_default(),
            endpoint: req.endpoint.clone().unwrap_or_default(),
            dns: req.dns.clone().unwrap_or_default(),
        }
    }
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_id: Option<i64>,
    /// Bytes; 0 means unlimited.
    pub traffic_limit: u64,
    pub duration_seconds: u32,
}

impl From<&NewUser> for proto::CreateUserRequest {
    fn from(req: &NewUser) -> Self {
        Self {
            social_id: req.social_id,
            traffic_limit: req.traffic_limit,
            duration_seconds: i32::try_from(req.duration_seconds).unwrap_or(i32::MAX),
        }
    }
}

/// Partial update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl UserEdit {
    pub(crate) fn to_proto(&self, user_key: &str) -> proto::EditUserRequest {
        proto::EditUserRequest {
            user_key: user_key.to_owned(),
            traffic_limit: self.traffic_limit,
            duration_seconds: self
                .duration_seconds
                .map(|d| i32::try_from(d).unwrap_or(i32::MAX)),
            social_id: self.social_id,
        }
    }
}
