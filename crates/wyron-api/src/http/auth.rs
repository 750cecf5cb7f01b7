// HTTP authentication
//
// `POST /auth/login` with `{username, password}` answers `{token}`; the
// token is then sent as `Authorization: Bearer <token>`.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::http::client::HttpClient;
use crate::http::types::{LoginRequest, LoginResponse};
use crate::session::{Authenticator, Credentials};

/// Exchanges credentials for a bearer token over HTTP.
pub struct HttpAuthenticator {
    http: reqwest::Client,
    login_url: Url,
}

impl HttpAuthenticator {
    pub(crate) fn new(http: reqwest::Client, api_base: &Url) -> Result<Self, Error> {
        Ok(Self {
            http,
            login_url: api_base.join("auth/login")?,
        })
    }
}

impl Authenticator for HttpAuthenticator {
    fn authenticate(
        &self,
        credentials: &Credentials,
        deadline: Instant,
    ) -> impl Future<Output = Result<SecretString, Error>> + Send {
        debug!(url = %self.login_url, "requesting token");
        let request = self
            .http
            .post(self.login_url.clone())
            .timeout(deadline.saturating_duration_since(Instant::now()))
            .json(&LoginRequest {
                username: credentials.username(),
                password: credentials.password().expose_secret(),
            });

        async move {
            let resp = request.send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Authentication {
                    message: format!("login rejected (HTTP {status}): {body}"),
                });
            }

            let body = resp.text().await?;
            let login: LoginResponse =
                serde_json::from_str(&body).map_err(|e| Error::Authentication {
                    message: format!("unreadable login response: {e}"),
                })?;
            Ok(SecretString::from(login.token.unwrap_or_default()))
        }
    }
}

impl HttpClient {
    /// The identity behind the current token.
    ///
    /// `GET /auth/me`
    pub async fn me(&self) -> Result<serde_json::Value, Error> {
        self.get(&["auth", "me"], &[]).await
    }

    /// Invalidate the current token on the server.
    ///
    /// `POST /auth/logout`. The local token is left in place; the next
    /// call that gets a 401 logs in again.
    pub async fn logout(&self) -> Result<serde_json::Value, Error> {
        debug!("logging out");
        self.post(&["auth", "logout"], None::<&()>).await
    }
}
