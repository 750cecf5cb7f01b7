// ── Connection profile assembly ──
//
// Turns a user's peer slot plus the interface it lives on into the
// WireGuard client configuration text. The server is looked up through
// `ServerLookup`, so the same code runs against a live client or an
// already-fetched server list.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{CoreError, InterfaceField};
use crate::model::{Interface, Peer, Server};

/// Anything that can produce a server by id.
pub trait ServerLookup {
    fn lookup_server(&self, server_id: &str)
    -> impl Future<Output = Result<Server, CoreError>> + Send;
}

impl ServerLookup for [Server] {
    fn lookup_server(
        &self,
        server_id: &str,
    ) -> impl Future<Output = Result<Server, CoreError>> + Send {
        let found = self
            .iter()
            .find(|server| server.id == server_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "server",
                identifier: server_id.to_owned(),
            });
        std::future::ready(found)
    }
}

/// A fully resolved client configuration for one peer.
///
/// `Debug` redacts the private key; only [`ConnectionProfile::render`]
/// exposes it.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub address: String,
    pub dns: Option<String>,
    pub private_key: SecretString,
    pub endpoint: String,
    pub port: u16,
    pub public_key: String,
}

impl ConnectionProfile {
    /// Look up the peer's server and assemble its profile.
    ///
    /// Fails with `MissingPrivateKey` before any lookup when the peer holds
    /// no key. Lookup failures are returned unchanged.
    pub async fn resolve<L>(peer: &Peer, lookup: &L) -> Result<Self, CoreError>
    where
        L: ServerLookup + ?Sized,
    {
        if peer.private_key.is_none() {
            return Err(CoreError::MissingPrivateKey);
        }
        debug!(server_id = %peer.server_id, interface = %peer.interface, "resolving peer profile");
        let server = lookup.lookup_server(&peer.server_id).await?;
        Self::assemble(peer, &server)
    }

    /// Assemble from an already-fetched server. Pure.
    pub fn assemble(peer: &Peer, server: &Server) -> Result<Self, CoreError> {
        let private_key = peer
            .private_key
            .clone()
            .ok_or(CoreError::MissingPrivateKey)?;

        let iface = server
            .interface(&peer.interface)
            .ok_or_else(|| CoreError::InterfaceNotFound {
                interface: peer.interface.clone(),
                server_id: peer.server_id.clone(),
            })?;

        let missing = |field| CoreError::InterfaceMissingKey {
            interface: iface.name.clone(),
            field,
        };
        let endpoint = iface
            .endpoint
            .clone()
            .ok_or_else(|| missing(InterfaceField::Endpoint))?;
        let public_key = iface
            .public_key
            .clone()
            .ok_or_else(|| missing(InterfaceField::PublicKey))?;
        let port = iface.port.ok_or_else(|| missing(InterfaceField::Port))?;

        Ok(Self {
            address: peer.allowed_address.clone(),
            dns: dns(iface),
            private_key,
            endpoint,
            port,
            public_key,
        })
    }

    /// The WireGuard configuration text. Deterministic for equal inputs.
    pub fn render(&self) -> String {
        let mut out = String::from("[Interface]\n");
        out.push_str(&format!("Address = {}\n", self.address));
        if let Some(dns) = &self.dns {
            out.push_str(&format!("DNS = {dns}\n"));
        }
        out.push_str(&format!(
            "PrivateKey = {}\n",
            self.private_key.expose_secret()
        ));
        out.push_str("\n[Peer]\n");
        out.push_str("AllowedIPs = 0.0.0.0/0\n");
        out.push_str(&format!("Endpoint = {}:{}\n", self.endpoint, self.port));
        out.push_str(&format!("PublicKey = {}\n", self.public_key));
        out
    }
}

fn dns(iface: &Interface) -> Option<String> {
    iface.dns.clone().filter(|dns| !dns.trim().is_empty())
}
