// wyron-core: Transport-neutral Wyron client with a unified domain model.

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod profile;
pub mod requests;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::Client;
pub use config::{ClientConfig, Endpoint};
pub use error::{CoreError, InterfaceField};
pub use profile::{ConnectionProfile, ServerLookup};
pub use requests::{InterfaceUpdate, NewUser, ServerUpdate, UserEdit};

pub use model::{Identity, Interface, Metrics, Peer, Protocol, Server, User, UserPage};

// Transport-level knobs callers need without depending on wyron-api.
pub use wyron_api::{CallContext, ListUsersOptions, RpcSecurity, SortOrder};
