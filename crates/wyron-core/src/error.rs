// ── Domain error type ──
//
// Wraps transport errors from `wyron-api` and adds the failures that only
// exist at the domain level: missing entities and connection-profile
// assembly problems.

use std::time::Duration;

use strum::Display;
use thiserror::Error;

/// The interface attribute a connection profile could not be built without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum InterfaceField {
    Endpoint,
    PublicKey,
    Port,
}

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Request cancelled")]
    Cancelled,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    // ── Connection profile errors ────────────────────────────────────
    #[error("peer has no private key")]
    MissingPrivateKey,

    #[error("interface {interface} not found on server {server_id}")]
    InterfaceNotFound { interface: String, server_id: String },

    #[error("interface {interface} is missing its {field}")]
    InterfaceMissingKey {
        interface: String,
        field: InterfaceField,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported {
        operation: &'static str,
        required: &'static str,
    },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── Transport and remote errors ──────────────────────────────────
    /// Network, HTTP, RPC, and decoding failures, kept intact so the
    /// status code and body stay inspectable.
    #[error(transparent)]
    Api(wyron_api::Error),
}

impl CoreError {
    /// HTTP or RPC status code of a remote failure.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Api(e) => e.status_code(),
            _ => None,
        }
    }

    /// `true` for a missing entity, whether reported locally or by the remote.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::InterfaceNotFound { .. } => true,
            Self::Api(e) => e.is_not_found(),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wyron_api::Error> for CoreError {
    fn from(err: wyron_api::Error) -> Self {
        match err {
            wyron_api::Error::Configuration { message } => CoreError::Config { message },
            wyron_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wyron_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            wyron_api::Error::Timeout { after } => CoreError::Timeout { after },
            wyron_api::Error::Cancelled => CoreError::Cancelled,
            wyron_api::Error::UnsupportedOperation(operation) => CoreError::Unsupported {
                operation,
                required: "a different transport",
            },
            other => CoreError::Api(other),
        }
    }
}
