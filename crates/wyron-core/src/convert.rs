// ── API-to-domain type conversions ──
//
// Bridges the HTTP JSON types and the RPC protobuf messages into the
// canonical `wyron_core::model` types. Empty strings, zero ports and zero
// timestamps all become `None`, so both transports yield identical values
// for identical data.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use wyron_api::http::types as http;
use wyron_api::rpc::proto;

use crate::error::CoreError;
use crate::model::{Interface, Metrics, Peer, Server, User};

// ── Helpers ────────────────────────────────────────────────────────

/// Epoch seconds to `DateTime<Utc>`; zero and out-of-range values are absent.
fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    (epoch != 0)
        .then(|| DateTime::from_timestamp(epoch, 0))
        .flatten()
}

fn non_empty(raw: String) -> Option<String> {
    (!raw.is_empty()).then_some(raw)
}

fn non_empty_opt(raw: Option<String>) -> Option<String> {
    raw.and_then(non_empty)
}

/// A usable port is 1..=65535.
fn port(raw: i64) -> Option<u16> {
    u16::try_from(raw).ok().filter(|p| *p != 0)
}

fn unsigned(raw: Option<i64>) -> u64 {
    raw.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

fn duration(seconds: i64) -> Option<Duration> {
    u64::try_from(seconds)
        .ok()
        .filter(|s| *s != 0)
        .map(Duration::from_secs)
}

fn secret(raw: Option<String>) -> Option<SecretString> {
    non_empty_opt(raw).map(SecretString::from)
}

// ── HTTP ───────────────────────────────────────────────────────────

impl From<http::WireGuardInterface> for Interface {
    fn from(i: http::WireGuardInterface) -> Self {
        Self {
            name: i.name,
            display_name: non_empty_opt(i.display_name),
            subnet: non_empty_opt(i.subnet),
            endpoint: non_empty_opt(i.endpoint),
            dns: non_empty_opt(i.dns),
            port: i.port.and_then(port),
            public_key: non_empty_opt(i.public_key),
            created_at: i.created_at.and_then(epoch_to_datetime),
        }
    }
}

impl From<http::Server> for Server {
    fn from(s: http::Server) -> Self {
        Self {
            id: s.name,
            address: s.address,
            username: s.username,
            display_name: non_empty_opt(s.display_name),
            created_at: s.created_at.and_then(epoch_to_datetime),
            interfaces: s
                .interfaces
                .unwrap_or_default()
                .into_iter()
                .map(Interface::from)
                .collect(),
        }
    }
}

impl From<http::PeerState> for Peer {
    fn from(p: http::PeerState) -> Self {
        Self {
            server_id: p.server_id,
            interface: p.interface,
            allowed_address: p.allowed_address,
            private_key: secret(p.private_key),
        }
    }
}

impl From<http::User> for User {
    fn from(u: http::User) -> Self {
        Self {
            user_key: u.user_key,
            sub_token: u.sub_token,
            social_id: u.social_id.filter(|id| *id != 0),
            active: u.active,
            traffic_limit: unsigned(u.traffic_limit),
            usage: unsigned(u.usage),
            duration: u.duration_seconds.and_then(duration),
            created_at: u.created_at.and_then(epoch_to_datetime),
            first_connected_at: u.first_connected_at.and_then(epoch_to_datetime),
            last_connected_at: u.last_connected_at.and_then(epoch_to_datetime),
            created_by: u.created_by,
            peers: u
                .peers
                .unwrap_or_default()
                .into_iter()
                .map(Peer::from)
                .collect(),
        }
    }
}

/// HTTP metrics arrive as a free-form object, bare or inside a `result`
/// or `data` envelope. Anything else is a deserialization error carrying
/// the raw body.
pub(crate) fn metrics_from_json(value: serde_json::Value) -> Result<Metrics, CoreError> {
    let body = value.to_string();
    let unwrapped = match value {
        serde_json::Value::Object(mut map) => {
            let envelope = ["result", "data"]
                .into_iter()
                .find(|key| map.get(*key).is_some_and(serde_json::Value::is_object));
            match envelope {
                Some(key) => map.remove(key).unwrap_or_default(),
                None => serde_json::Value::Object(map),
            }
        }
        other => other,
    };
    if !unwrapped.is_object() {
        return Err(metrics_error("expected a JSON object", body));
    }
    serde_json::from_value(unwrapped).map_err(|e| metrics_error(&e.to_string(), body))
}

fn metrics_error(reason: &str, body: String) -> CoreError {
    CoreError::Api(wyron_api::Error::Deserialization {
        message: format!("metrics: {reason}"),
        body,
    })
}

// ── RPC ────────────────────────────────────────────────────────────

impl From<proto::Interface> for Interface {
    fn from(i: proto::Interface) -> Self {
        Self {
            name: i.name,
            display_name: non_empty(i.display_name),
            subnet: non_empty(i.subnet),
            endpoint: non_empty(i.endpoint),
            dns: non_empty(i.dns),
            port: port(i64::from(i.port)),
            public_key: non_empty(i.public_key),
            created_at: epoch_to_datetime(i.created_at),
        }
    }
}

impl From<proto::Server> for Server {
    fn from(s: proto::Server) -> Self {
        Self {
            id: s.id,
            address: s.address,
            username: s.username,
            display_name: non_empty(s.display_name),
            created_at: epoch_to_datetime(s.created_at),
            interfaces: s.interfaces.into_iter().map(Interface::from).collect(),
        }
    }
}

impl From<proto::Peer> for Peer {
    fn from(p: proto::Peer) -> Self {
        Self {
            server_id: p.server_id,
            interface: p.interface,
            allowed_address: p.allowed_address,
            private_key: secret(Some(p.private_key)),
        }
    }
}

impl From<proto::User> for User {
    fn from(u: proto::User) -> Self {
        Self {
            user_key: u.user_key,
            sub_token: u.sub_token,
            social_id: (u.social_id != 0).then_some(u.social_id),
            active: u.active,
            traffic_limit: u.traffic_limit,
            usage: u.usage,
            duration: duration(i64::from(u.duration_seconds)),
            created_at: epoch_to_datetime(u.created_at),
            first_connected_at: epoch_to_datetime(u.first_connected_at),
            last_connected_at: epoch_to_datetime(u.last_connected_at),
            created_by: u.created_by,
            peers: u.peers.into_iter().map(Peer::from).collect(),
        }
    }
}

impl From<proto::MetricsResponse> for Metrics {
    fn from(m: proto::MetricsResponse) -> Self {
        Self {
            total_users: unsigned(Some(m.total_users)),
            active_users: unsigned(Some(m.active_users)),
            disabled_users: unsigned(Some(m.disabled_users)),
            total_usage: m.total_usage,
            extra: serde_json::Map::new(),
        }
    }
}
