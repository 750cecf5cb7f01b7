// ── Server domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WireGuard interface on a managed server.
///
/// Absent attributes are `None`; the wire's empty strings and zero port
/// never reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub display_name: Option<String>,
    pub subnet: Option<String>,
    pub endpoint: Option<String>,
    pub dns: Option<String>,
    pub port: Option<u16>,
    pub public_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A managed VPN server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Stable identifier. The HTTP API calls this `name`.
    pub id: String,
    pub address: String,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub interfaces: Vec<Interface>,
}

impl Server {
    /// The first interface named `name`.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }
}
