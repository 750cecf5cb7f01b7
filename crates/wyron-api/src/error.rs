use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `wyron-api` crate.
///
/// Covers every failure mode across both transports: construction-time
/// configuration, authentication, the HTTP and RPC transports, and
/// remote application errors. `wyron-core` wraps these into its own
/// domain errors without losing the distinguishing kind.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Malformed construction input (empty credentials, bad proxy URL, ...).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected or returned no usable token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// RPC channel could not be built or connected.
    #[error("RPC transport error: {0}")]
    Connect(#[from] tonic::transport::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The call deadline elapsed before a response arrived.
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The caller cancelled the call before it completed.
    #[error("Request cancelled")]
    Cancelled,

    // ── Remote application errors ───────────────────────────────────
    /// Non-2xx response from the HTTP API.
    #[error("API error: {method} {path} status={status} body={body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// Non-OK status from an RPC operation.
    #[error("RPC error: {operation}: {status}")]
    Rpc {
        operation: &'static str,
        status: Box<tonic::Status>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Capability ──────────────────────────────────────────────────
    /// Operation not offered by the selected transport.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn rpc(operation: &'static str, status: tonic::Status) -> Self {
        Self::Rpc {
            operation,
            status: Box::new(status),
        }
    }

    /// Returns `true` if the remote side rejected the presented token.
    ///
    /// This is the only condition the call wrapper treats as recoverable:
    /// HTTP `401 Unauthorized` or RPC `UNAUTHENTICATED`.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 401,
            Self::Rpc { status, .. } => status.code() == tonic::Code::Unauthenticated,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Advisory only: the client itself never retries these.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Connect(_) => true,
            Self::Rpc { status, .. } => status.code() == tonic::Code::Unavailable,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 404,
            Self::Rpc { status, .. } => status.code() == tonic::Code::NotFound,
            _ => false,
        }
    }

    /// Returns `true` if the caller cancelled the call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status code or RPC status code (as `i32`), if the remote answered.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Api { status, .. } => Some(i32::from(*status)),
            Self::Rpc { status, .. } => Some(i32::from(status.code())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            method: "GET".into(),
            path: "/servers".into(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn only_unauthorized_counts_as_auth_expiry() {
        assert!(api(401).is_auth_expired());
        assert!(!api(403).is_auth_expired());
        assert!(!api(404).is_auth_expired());
        assert!(!api(500).is_auth_expired());
        assert!(
            Error::rpc("UserService/Get", tonic::Status::unauthenticated("expired")).is_auth_expired()
        );
        assert!(
            !Error::rpc("UserService/Get", tonic::Status::permission_denied("no")).is_auth_expired()
        );
        assert!(
            !Error::Authentication {
                message: "bad password".into()
            }
            .is_auth_expired()
        );
        assert!(!Error::Cancelled.is_auth_expired());
    }

    #[test]
    fn not_found_across_transports() {
        assert!(api(404).is_not_found());
        assert!(Error::rpc("ServerService/Get", tonic::Status::not_found("gone")).is_not_found());
        assert!(!api(400).is_not_found());
    }

    #[test]
    fn api_error_message_carries_diagnostics() {
        let err = Error::Api {
            method: "DELETE".into(),
            path: "/users/u1".into(),
            status: 409,
            body: "conflict".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error: DELETE /users/u1 status=409 body=conflict"
        );
    }
}
