// RPC transport client
//
// Holds one lazily-connected channel. Each call builds a fresh service
// stub over it, attaches `authorization: Bearer <token>` metadata and the
// remaining deadline, and runs through the session's call wrapper so an
// `UNAUTHENTICATED` status triggers exactly one re-login and one retry.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tonic::metadata::MetadataValue;
use tonic::transport::Channel;
use tracing::{debug, trace};

use crate::call::{Attempt, CallContext};
use crate::error::Error;
use crate::rpc::proto::{AuthServiceClient, LoginRequest};
use crate::session::{Authenticator, Credentials, Session};
use crate::transport::{RpcSecurity, TransportConfig};

/// Exchanges credentials for a bearer token via `AuthService/Login`.
pub struct RpcAuthenticator {
    channel: Channel,
}

impl Authenticator for RpcAuthenticator {
    fn authenticate(
        &self,
        credentials: &Credentials,
        deadline: Instant,
    ) -> impl Future<Output = Result<SecretString, Error>> + Send {
        let mut client = AuthServiceClient::new(self.channel.clone());
        let mut request = tonic::Request::new(LoginRequest {
            username: credentials.username().to_owned(),
            password: credentials.password().expose_secret().to_owned(),
        });
        request.set_timeout(deadline.saturating_duration_since(Instant::now()));

        async move {
            let response = client
                .login(request)
                .await
                .map_err(|status| Error::rpc("AuthService/Login", status))?;
            Ok(SecretString::from(response.into_inner().token))
        }
    }
}

/// Async client for the RPC API.
///
/// Cheap to clone: clones share the session and the channel.
#[derive(Clone)]
pub struct RpcClient {
    channel: Channel,
    session: Arc<Session<RpcAuthenticator>>,
    context: CallContext,
}

impl RpcClient {
    /// Build the channel and log in.
    ///
    /// `host` is `host:port`, optionally prefixed with `http://` or
    /// `https://` matching `security`.
    pub async fn connect(
        host: &str,
        security: &RpcSecurity,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let channel = transport.build_channel(host, security)?;
        Self::with_channel(channel, credentials, transport).await
    }

    /// Log in over an existing channel.
    pub async fn with_channel(
        channel: Channel,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let authenticator = RpcAuthenticator {
            channel: channel.clone(),
        };
        let session = Session::establish(authenticator, credentials, transport.timeout).await?;
        debug!("rpc client ready");
        Ok(Self {
            channel,
            session: Arc::new(session),
            context: CallContext::default(),
        })
    }

    /// A clone whose calls run under `context` (deadline, cancellation).
    #[must_use]
    pub fn with_context(&self, context: CallContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    pub fn session(&self) -> &Session<RpcAuthenticator> {
        &self.session
    }

    /// The token currently attached to calls.
    pub async fn token(&self) -> Option<SecretString> {
        self.session.token().await
    }

    pub(crate) fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Run one unary RPC under the session's retry policy.
    ///
    /// `send` gets a fully prepared request per attempt and performs the
    /// actual stub call.
    pub(crate) async fn unary<Req, Resp, F, Fut>(
        &self,
        operation: &'static str,
        message: Req,
        send: F,
    ) -> Result<Resp, Error>
    where
        Req: Clone,
        F: Fn(tonic::Request<Req>) -> Fut,
        Fut: Future<Output = Result<tonic::Response<Resp>, tonic::Status>>,
    {
        trace!(operation, "rpc call");
        self.session
            .call_with(&self.context, |attempt| {
                let prepared = authorized(message.clone(), &attempt).map(&send);
                async move {
                    prepared?
                        .await
                        .map(tonic::Response::into_inner)
                        .map_err(|status| Error::rpc(operation, status))
                }
            })
            .await
    }
}

/// Wrap `message` with the attempt's deadline and bearer metadata.
fn authorized<T>(message: T, attempt: &Attempt) -> Result<tonic::Request<T>, Error> {
    let mut request = tonic::Request::new(message);
    request.set_timeout(attempt.remaining());
    if let Some(token) = attempt.token() {
        let value = MetadataValue::try_from(format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::Authentication {
                message: "token is not a valid metadata value".into(),
            })?;
        request.metadata_mut().insert("authorization", value);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn attempt(token: Option<&str>) -> Attempt {
        Attempt {
            token: token.map(|t| SecretString::from(t.to_owned())),
            deadline: Instant::now() + Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn bearer_metadata_is_attached() {
        let request = authorized((), &attempt(Some("tok-1"))).unwrap();
        assert_eq!(
            request
                .metadata()
                .get("authorization")
                .unwrap()
                .to_str()
                .unwrap(),
            "Bearer tok-1"
        );
    }

    #[tokio::test]
    async fn no_token_means_no_metadata() {
        let request = authorized((), &attempt(None)).unwrap();
        assert!(request.metadata().get("authorization").is_none());
    }

    #[tokio::test]
    async fn deadline_becomes_grpc_timeout() {
        let request = authorized((), &attempt(Some("t"))).unwrap();
        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[tokio::test]
    async fn token_with_newline_is_rejected() {
        let result = authorized((), &attempt(Some("bad\ntoken")));
        assert!(matches!(result, Err(Error::Authentication { .. })));
    }
}
