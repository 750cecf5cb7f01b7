// ── User and peer domain types ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A peer slot a user holds on one server interface.
///
/// The private key is never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Peer {
    pub server_id: String,
    pub interface: String,
    pub allowed_address: String,
    #[serde(skip)]
    pub private_key: Option<SecretString>,
}

impl Peer {
    pub fn new(
        server_id: impl Into<String>,
        interface: impl Into<String>,
        allowed_address: impl Into<String>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            interface: interface.into(),
            allowed_address: allowed_address.into(),
            private_key: None,
        }
    }

    #[must_use]
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.private_key = (!key.is_empty()).then(|| SecretString::from(key));
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub user_key: String,
    pub sub_token: String,
    pub social_id: Option<i64>,
    pub active: bool,
    /// Bytes; 0 means unlimited.
    pub traffic_limit: u64,
    /// Bytes consumed in the current period.
    pub usage: u64,
    pub duration: Option<Duration>,
    pub created_at: Option<DateTime<Utc>>,
    pub first_connected_at: Option<DateTime<Utc>>,
    pub last_connected_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub peers: Vec<Peer>,
}

/// One page of `list_users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    /// Total matching users, when the transport reports it.
    pub total: Option<u64>,
}
