// ── Unified domain model ──
//
// Both transports map their wire types into these. Consumers never see
// transport-specific shapes.

pub mod common;
pub mod server;
pub mod user;

pub use common::{Identity, Metrics, Protocol};
pub use server::{Interface, Server};
pub use user::{Peer, User, UserPage};
