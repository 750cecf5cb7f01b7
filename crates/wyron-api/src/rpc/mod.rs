// RPC transport
//
// Protobuf over HTTP/2 (tonic), bearer token in call metadata.

pub mod auth;
pub mod client;
pub mod proto;
pub mod servers;
pub mod users;

pub use client::{RpcAuthenticator, RpcClient};
