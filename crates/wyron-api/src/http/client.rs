// HTTP transport client
//
// Wraps `reqwest::Client` with base-URL construction, bearer-token
// injection, and non-2xx mapping. Every request runs through the session's
// call wrapper so a rejected token triggers exactly one re-login and one
// retry. Endpoint groups (auth, servers, users) are inherent methods in
// sibling files.

use std::sync::Arc;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::call::CallContext;
use crate::error::Error;
use crate::http::auth::HttpAuthenticator;
use crate::session::{Credentials, Session};
use crate::transport::TransportConfig;

/// Async client for the HTTP API under `<base>/api/`.
///
/// Cheap to clone: clones share the session and connection pool.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session<HttpAuthenticator>>,
    context: CallContext,
}

impl HttpClient {
    /// Build the transport and log in.
    ///
    /// `base_url` is the service root (e.g. `https://vpn.example.com`);
    /// the `/api` suffix is appended here.
    pub async fn connect(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_http_client()?;
        Self::with_client(http, base_url, credentials, transport).await
    }

    /// Log in over a pre-built `reqwest::Client`.
    pub async fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = api_base_url(base_url)?;
        let authenticator = HttpAuthenticator::new(http.clone(), &base_url)?;
        let session = Session::establish(authenticator, credentials, transport.timeout).await?;
        debug!(base_url = %base_url, "http client ready");
        Ok(Self {
            http,
            base_url,
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

    /// The resolved `<base>/api/` URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Session<HttpAuthenticator> {
        &self.session
    }

    /// The token currently attached to requests.
    pub async fn token(&self) -> Option<SecretString> {
        self.session.token().await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `<base>/api/<segments...>`, each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        self.send(Method::GET, segments, query, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        self.send(Method::POST, segments, &[], body).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send(Method::PATCH, segments, &[], Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        self.send(Method::DELETE, segments, &[], None::<&()>).await
    }

    /// Send one logical request: bearer auth, per-attempt timeout, and the
    /// retry-once-on-401 policy. The body is re-encoded for each attempt.
    async fn send<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let path = url.path().to_owned();
        debug!(%method, %path, "sending request");

        let raw = self
            .session
            .call_with(&self.context, |attempt| {
                let mut builder = self
                    .http
                    .request(method.clone(), url.clone())
                    .timeout(attempt.remaining());
                if !query.is_empty() {
                    builder = builder.query(query);
                }
                if let Some(body) = body {
                    builder = builder.json(body);
                }
                if let Some(token) = attempt.token() {
                    builder = builder.bearer_auth(token.expose_secret());
                }
                let method = method.as_str().to_owned();
                let path = path.clone();
                async move {
                    let resp = builder.send().await?;
                    let status = resp.status();
                    let text = resp.text().await?;
                    if !status.is_success() {
                        return Err(Error::Api {
                            method,
                            path,
                            status: status.as_u16(),
                            body: text,
                        });
                    }
                    Ok(text)
                }
            })
            .await?;

        trace!(%path, bytes = raw.len(), "response received");
        decode(&raw)
    }
}

/// Parse a response body; an empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

/// Normalize a service root into `<root>/api/`.
///
/// Trailing slashes are dropped and an existing `/api` suffix is not
/// doubled.
pub(crate) fn api_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::config("base URL is required"));
    }
    let mut url =
        Url::parse(trimmed).map_err(|e| Error::config(format!("invalid base URL {trimmed:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "base URL must use http or https, got {:?}",
            url.scheme()
        )));
    }
    let path = url.path().trim_end_matches('/').to_owned();
    let path = if path.ends_with("/api") {
        format!("{path}/")
    } else {
        format!("{path}/api/")
    };
    url.set_path(&path);
    Ok(url)
}
