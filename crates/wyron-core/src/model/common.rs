// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};
use strum::Display;

/// Which transport a client talks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Rpc,
}

/// The account behind the active token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

/// Service-wide user statistics.
///
/// Counters the service does not report stay at zero; anything it reports
/// beyond these lands in `extra` (HTTP only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub disabled_users: u64,
    #[serde(default)]
    pub total_usage: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
