// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Wyron service. They carry
// credential data and connection tuning, but never touch disk; the
// `wyron-config` crate builds one from a profile.

use std::time::Duration;

use secrecy::SecretString;

use wyron_api::RpcSecurity;
use wyron_api::transport::DEFAULT_TIMEOUT;

use crate::model::Protocol;

/// Where the service listens, per transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Service root, e.g. `https://vpn.example.com`. `/api` is appended.
    Http { base_url: String },
    /// `host:port` of the RPC listener.
    Rpc { host: String, security: RpcSecurity },
}

impl Endpoint {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Http { .. } => Protocol::Http,
            Self::Rpc { .. } => Protocol::Rpc,
        }
    }
}

/// Everything needed to construct a `Client`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub username: String,
    pub password: SecretString,
    /// `http(s)://` or `socks5(h)://` proxy URL. RPC accepts SOCKS only.
    pub proxy: Option<String>,
    /// Default per-call deadline; zero falls back to 15 s.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn http(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self::new(
            Endpoint::Http {
                base_url: base_url.into(),
            },
            username,
            password,
        )
    }

    pub fn rpc(host: impl Into<String>, username: impl Into<String>, password: SecretString) -> Self {
        Self::new(
            Endpoint::Rpc {
                host: host.into(),
                security: RpcSecurity::default(),
            },
            username,
            password,
        )
    }

    fn new(endpoint: Endpoint, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// RPC security; ignored for HTTP, where the URL scheme decides.
    #[must_use]
    pub fn with_security(mut self, security: RpcSecurity) -> Self {
        if let Endpoint::Rpc { security: current, .. } = &mut self.endpoint {
            *current = security;
        }
        self
    }
}
