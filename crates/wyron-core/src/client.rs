// ── Transport-neutral client facade ──
//
// One type, one set of operations, two interchangeable backends. Each
// method dispatches to the HTTP or RPC client, maps the wire types into
// the domain model, and papers over the few places where the two APIs
// disagree in shape. Operations only one transport offers fail with
// `CoreError::Unsupported` on the other.

use std::future::Future;

use secrecy::SecretString;
use tracing::{debug, info};

use wyron_api::{CallContext, Credentials, HttpClient, ListUsersOptions, RpcClient, TransportConfig};

use crate::config::{ClientConfig, Endpoint};
use crate::convert::metrics_from_json;
use crate::error::CoreError;
use crate::model::{Identity, Interface, Metrics, Peer, Protocol, Server, User, UserPage};
use crate::profile::{ConnectionProfile, ServerLookup};
use crate::requests::{InterfaceUpdate, NewUser, ServerUpdate, UserEdit};

#[derive(Clone)]
enum Backend {
    Http(HttpClient),
    Rpc(RpcClient),
}

/// Authenticated client for a Wyron service.
///
/// Cheap to clone and safe to share across tasks; clones share one
/// session, so a re-login triggered by any of them serves all.
#[derive(Clone)]
pub struct Client {
    backend: Backend,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("protocol", &self.protocol())
            .finish_non_exhaustive()
    }
}

impl Client {
    // ── Construction ─────────────────────────────────────────────

    /// Validate `config`, build the transport, and log in.
    ///
    /// No client exists without a successful initial login.
    pub async fn connect(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::new(config.timeout, config.proxy.as_deref())?;
        let credentials = Credentials::new(config.username, config.password)?;

        let backend = match &config.endpoint {
            Endpoint::Http { base_url } => {
                Backend::Http(HttpClient::connect(base_url, credentials, &transport).await?)
            }
            Endpoint::Rpc { host, security } => {
                Backend::Rpc(RpcClient::connect(host, security, credentials, &transport).await?)
            }
        };
        info!(protocol = %config.endpoint.protocol(), "connected");
        Ok(Self { backend })
    }

    pub fn from_http(client: HttpClient) -> Self {
        Self {
            backend: Backend::Http(client),
        }
    }

    pub fn from_rpc(client: RpcClient) -> Self {
        Self {
            backend: Backend::Rpc(client),
        }
    }

    /// A clone whose calls run under `context` (deadline, cancellation).
    #[must_use]
    pub fn with_context(&self, context: CallContext) -> Self {
        let backend = match &self.backend {
            Backend::Http(c) => Backend::Http(c.with_context(context)),
            Backend::Rpc(c) => Backend::Rpc(c.with_context(context)),
        };
        Self { backend }
    }

    pub fn protocol(&self) -> Protocol {
        match self.backend {
            Backend::Http(_) => Protocol::Http,
            Backend::Rpc(_) => Protocol::Rpc,
        }
    }

    // ── Auth ─────────────────────────────────────────────────────

    /// Log in again now, replacing the current token.
    pub async fn login(&self) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => c.session().login().await?,
            Backend::Rpc(c) => c.session().login().await?,
        }
        Ok(())
    }

    /// The token attached to outgoing calls.
    pub async fn token(&self) -> Option<SecretString> {
        match &self.backend {
            Backend::Http(c) => c.token().await,
            Backend::Rpc(c) => c.token().await,
        }
    }

    pub async fn me(&self) -> Result<Identity, CoreError> {
        let username = match &self.backend {
            Backend::Http(c) => username_from_json(&c.me().await?).ok_or_else(|| {
                CoreError::OperationFailed {
                    message: "identity response carried no username".into(),
                }
            })?,
            Backend::Rpc(c) => c.me().await?,
        };
        Ok(Identity { username })
    }

    /// Invalidate the token server-side. HTTP only.
    pub async fn logout(&self) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.logout().await?;
                Ok(())
            }
            Backend::Rpc(_) => Err(unsupported("logout", Protocol::Http)),
        }
    }

    /// Create another administrator account. RPC only.
    pub async fn create_admin(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(_) => Err(unsupported("create_admin", Protocol::Rpc)),
            Backend::Rpc(c) => Ok(c.create_admin(username, password).await?),
        }
    }

    // ── Servers ──────────────────────────────────────────────────

    pub async fn list_servers(&self) -> Result<Vec<Server>, CoreError> {
        Ok(match &self.backend {
            Backend::Http(c) => c.list_servers().await?.into_iter().map(Server::from).collect(),
            Backend::Rpc(c) => c.list_servers().await?.into_iter().map(Server::from).collect(),
        })
    }

    /// `None` when the service reports no such server.
    pub async fn get_server(&self, server_id: &str) -> Result<Option<Server>, CoreError> {
        match &self.backend {
            Backend::Http(c) => Ok(c.get_server(server_id).await?.map(Server::from)),
            Backend::Rpc(c) => match c.get_server(server_id).await {
                Ok(server) => Ok(Some(Server::from(server))),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Create the server, or update it if `request.id` exists, and return
    /// the stored result.
    pub async fn create_or_update_server(&self, request: &ServerUpdate) -> Result<Server, CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                let reply = c.create_or_update_server(request).await?;
                // The HTTP reply only echoes the id; fetch the stored server.
                let id = reply
                    .get("name")
                    .and_then(serde_json::Value::as_str)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| CoreError::OperationFailed {
                        message: "server create/update succeeded but the reply has no name".into(),
                    })?
                    .to_owned();
                debug!(server_id = %id, "re-fetching server after update");
                self.get_server(&id)
                    .await?
                    .ok_or_else(|| CoreError::OperationFailed {
                        message: format!("server {id} missing after update"),
                    })
            }
            Backend::Rpc(c) => Ok(Server::from(c.create_or_update_server(request.into()).await?)),
        }
    }

    pub async fn delete_server(&self, server_id: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.delete_server(server_id).await?;
            }
            Backend::Rpc(c) => c.delete_server(server_id).await?,
        }
        Ok(())
    }

    /// Create or update an interface and return it as stored.
    pub async fn update_interface(&self, request: &InterfaceUpdate) -> Result<Interface, CoreError> {
        let missing = || CoreError::OperationFailed {
            message: format!(
                "interface {} missing on server {} after update",
                request.name, request.server_id
            ),
        };
        match &self.backend {
            Backend::Http(c) => {
                c.update_interface(&request.server_id, request).await?;
                let server = self
                    .get_server(&request.server_id)
                    .await?
                    .ok_or_else(missing)?;
                server.interface(&request.name).cloned().ok_or_else(missing)
            }
            Backend::Rpc(c) => c
                .update_interface(request.into())
                .await?
                .map(Interface::from)
                .ok_or_else(missing),
        }
    }

    pub async fn delete_interface(&self, server_id: &str, name: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.delete_interface(server_id, name).await?;
            }
            Backend::Rpc(c) => c.delete_interface(server_id, name).await?,
        }
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────

    /// One page of users. `total` is only reported over RPC.
    pub async fn list_users(&self, options: &ListUsersOptions) -> Result<UserPage, CoreError> {
        match &self.backend {
            Backend::Http(c) => Ok(UserPage {
                users: c.list_users(options).await?.into_iter().map(User::from).collect(),
                total: None,
            }),
            Backend::Rpc(c) => {
                let page = c.list_users(options).await?;
                Ok(UserPage {
                    users: page.users.into_iter().map(User::from).collect(),
                    total: u64::try_from(page.count).ok(),
                })
            }
        }
    }

    /// `None` when the service reports no such user.
    pub async fn get_user(&self, user_key: &str) -> Result<Option<User>, CoreError> {
        match &self.backend {
            Backend::Http(c) => Ok(c.get_user(user_key).await?.map(User::from)),
            Backend::Rpc(c) => match c.get_user(user_key).await {
                Ok(user) => Ok(Some(User::from(user))),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    pub async fn create_user(&self, request: &NewUser) -> Result<User, CoreError> {
        match &self.backend {
            Backend::Http(c) => c
                .create_user(request)
                .await?
                .map(User::from)
                .ok_or_else(|| empty_reply("create_user")),
            Backend::Rpc(c) => Ok(User::from(c.create_user(request.into()).await?)),
        }
    }

    pub async fn edit_user(&self, user_key: &str, edit: &UserEdit) -> Result<User, CoreError> {
        match &self.backend {
            Backend::Http(c) => c
                .edit_user(user_key, edit)
                .await?
                .map(User::from)
                .ok_or_else(|| empty_reply("edit_user")),
            Backend::Rpc(c) => Ok(User::from(c.edit_user(edit.to_proto(user_key)).await?)),
        }
    }

    pub async fn delete_user(&self, user_key: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.delete_user(user_key).await?;
            }
            Backend::Rpc(c) => c.delete_user(user_key).await?,
        }
        Ok(())
    }

    pub async fn enable_user(&self, user_key: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.enable_user(user_key).await?;
            }
            Backend::Rpc(c) => c.enable_user(user_key).await?,
        }
        Ok(())
    }

    pub async fn disable_user(&self, user_key: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.disable_user(user_key).await?;
            }
            Backend::Rpc(c) => c.disable_user(user_key).await?,
        }
        Ok(())
    }

    pub async fn reset_usage(&self, user_key: &str) -> Result<(), CoreError> {
        match &self.backend {
            Backend::Http(c) => {
                c.reset_usage(user_key).await?;
            }
            Backend::Rpc(c) => c.reset_usage(user_key).await?,
        }
        Ok(())
    }

    /// Replace the user's subscription token. RPC only.
    pub async fn revoke_sub_token(&self, user_key: &str) -> Result<User, CoreError> {
        match &self.backend {
            Backend::Http(_) => Err(unsupported("revoke_sub_token", Protocol::Rpc)),
            Backend::Rpc(c) => Ok(User::from(c.revoke_sub_token(user_key).await?)),
        }
    }

    pub async fn metrics(&self) -> Result<Metrics, CoreError> {
        match &self.backend {
            Backend::Http(c) => metrics_from_json(c.metrics().await?),
            Backend::Rpc(c) => Ok(Metrics::from(c.metrics().await?)),
        }
    }

    // ── Peers ────────────────────────────────────────────────────

    /// Fetch the peer's server and render its WireGuard configuration.
    pub async fn peer_config(&self, peer: &Peer) -> Result<String, CoreError> {
        let profile = ConnectionProfile::resolve(peer, self).await?;
        Ok(profile.render())
    }
}

impl ServerLookup for Client {
    fn lookup_server(
        &self,
        server_id: &str,
    ) -> impl Future<Output = Result<Server, CoreError>> + Send {
        async move {
            self.get_server(server_id)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "server",
                    identifier: server_id.to_owned(),
                })
        }
    }
}

fn unsupported(operation: &'static str, required: Protocol) -> CoreError {
    CoreError::Unsupported {
        operation,
        required: match required {
            Protocol::Http => "the HTTP transport",
            Protocol::Rpc => "the RPC transport",
        },
    }
}

fn empty_reply(operation: &str) -> CoreError {
    CoreError::OperationFailed {
        message: format!("{operation} returned no user"),
    }
}

/// `username` from `/auth/me`, at the top level or inside a `data` or
/// `result` envelope.
fn username_from_json(value: &serde_json::Value) -> Option<String> {
    [value, &value["data"], &value["result"]]
        .into_iter()
        .find_map(|v| v.get("username").and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}
