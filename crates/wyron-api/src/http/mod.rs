// HTTP transport
//
// JSON over HTTP under `<base>/api/`, bearer-token authentication.

pub mod auth;
pub mod client;
pub mod servers;
pub mod types;
pub mod users;

pub use auth::HttpAuthenticator;
pub use client::HttpClient;
