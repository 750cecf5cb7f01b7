// wyron-api: Async Rust client transports for the Wyron VPN management API (HTTP + RPC)

pub mod call;
pub mod error;
pub mod http;
pub mod list;
pub mod rpc;
pub mod session;
pub mod transport;

pub use call::{Attempt, CallContext};
pub use error::Error;
pub use http::HttpClient;
pub use list::{ListUsersOptions, SortOrder};
pub use rpc::RpcClient;
pub use session::{Authenticator, Credentials, Session};
pub use transport::{Proxy, RpcSecurity, TransportConfig};
