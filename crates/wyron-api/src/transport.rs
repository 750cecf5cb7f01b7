// Shared transport construction for both API surfaces.
//
// A single `TransportConfig` carries the request timeout and the optional
// upstream proxy. It builds either a `reqwest::Client` (HTTP/JSON API) or
// a lazily-connecting tonic `Channel` (RPC API). Both objects are built
// once per client and reused for every call.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio_socks::tcp::Socks5Stream;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Uri};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Timeout applied when the caller passes a zero duration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("wyron-api/", env!("CARGO_PKG_VERSION"));

/// Upstream proxy, classified by how it intercepts traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proxy {
    /// `http://` / `https://` forward proxy, applied per request.
    Forward(Url),
    /// `socks5://` / `socks5h://` proxy, applied when dialing the connection.
    Socks(Url),
}

impl Proxy {
    /// Parse and classify a proxy URL.
    ///
    /// Fails immediately on malformed URLs or unknown schemes; nothing is dialed.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let url = Url::parse(raw.trim())
            .map_err(|e| Error::config(format!("invalid proxy URL {raw:?}: {e}")))?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("proxy URL {raw:?} has no host")));
        }

        match url.scheme() {
            "http" | "https" => Ok(Self::Forward(url)),
            "socks5" | "socks5h" => Ok(Self::Socks(url)),
            other => Err(Error::config(format!(
                "unsupported proxy scheme '{other}' (expected http, https, socks5 or socks5h)"
            ))),
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Self::Forward(url) | Self::Socks(url) => url,
        }
    }
}

/// Channel security for the RPC transport.
///
/// There is no implicit fallback: a `Tls` channel never degrades to plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RpcSecurity {
    /// Explicitly unencrypted channel.
    #[default]
    Plaintext,
    /// TLS with either a custom CA certificate (PEM file) or the system trust store.
    Tls {
        ca_certificate: Option<PathBuf>,
        /// Override for the server name checked against the certificate.
        domain: Option<String>,
    },
}

impl RpcSecurity {
    fn scheme(&self) -> &'static str {
        match self {
            Self::Plaintext => "http",
            Self::Tls { .. } => "https",
        }
    }
}

/// Shared transport configuration for building HTTP clients and RPC channels.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub proxy: Option<Proxy>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
        }
    }
}

impl TransportConfig {
    /// Validate raw inputs into a config.
    ///
    /// A zero timeout is replaced with [`DEFAULT_TIMEOUT`]; an empty proxy
    /// string means "no proxy".
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, Error> {
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        let proxy = proxy
            .filter(|raw| !raw.trim().is_empty())
            .map(Proxy::parse)
            .transpose()?;
        Ok(Self { timeout, proxy })
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// reqwest forwards HTTP(S) proxies per request and routes SOCKS
    /// proxies through its connector, which matches the two proxy classes.
    /// Without a configured proxy, environment proxy variables are ignored.
    pub fn build_http_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .tcp_keepalive(TCP_KEEPALIVE)
            .user_agent(USER_AGENT);

        builder = match &self.proxy {
            Some(proxy) => {
                debug!(proxy = %redacted(proxy.url()), "routing HTTP transport through proxy");
                let proxy = reqwest::Proxy::all(proxy.url().as_str())
                    .map_err(|e| Error::config(format!("invalid proxy: {e}")))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
    }

    /// Build a tonic `Channel` for `host` (`host:port` or a full URI).
    ///
    /// The channel connects lazily on first use. Only SOCKS proxies are
    /// supported here: they replace the dialer, so the RPC stream is
    /// tunnelled as raw TCP.
    pub fn build_channel(&self, host: &str, security: &RpcSecurity) -> Result<Channel, Error> {
        let uri = channel_uri(host, security)?;
        debug!(%uri, "building RPC channel");

        let mut endpoint = Endpoint::from_shared(uri)
            .map_err(|e| Error::config(format!("invalid RPC host {host:?}: {e}")))?
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .tcp_keepalive(Some(TCP_KEEPALIVE))
            .user_agent(USER_AGENT)
            .map_err(|e| Error::config(format!("invalid user agent: {e}")))?;

        if let RpcSecurity::Tls {
            ca_certificate,
            domain,
        } = security
        {
            let mut tls = match ca_certificate {
                Some(path) => {
                    let pem = std::fs::read(path).map_err(|e| {
                        Error::config(format!(
                            "failed to read CA certificate {}: {e}",
                            path.display()
                        ))
                    })?;
                    ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem))
                }
                None => ClientTlsConfig::new().with_enabled_roots(),
            };
            if let Some(domain) = domain {
                tls = tls.domain_name(domain.clone());
            }
            endpoint = endpoint.tls_config(tls)?;
        }

        match &self.proxy {
            None => Ok(endpoint.connect_lazy()),
            Some(Proxy::Socks(url)) => {
                debug!(proxy = %redacted(url), "routing RPC transport through SOCKS proxy");
                let proxy_addr = socks_address(url)?;
                let auth = socks_credentials(url);
                let connector = tower::service_fn(move |uri: Uri| {
                    let proxy_addr = proxy_addr.clone();
                    let auth = auth.clone();
                    async move {
                        let target = dial_target(&uri)?;
                        let stream = match auth {
                            Some((user, pass)) => {
                                Socks5Stream::connect_with_password(
                                    proxy_addr.as_str(),
                                    target,
                                    &user,
                                    &pass,
                                )
                                .await
                            }
                            None => Socks5Stream::connect(proxy_addr.as_str(), target).await,
                        }
                        .map_err(io::Error::other)?;
                        Ok::<_, io::Error>(TokioIo::new(stream.into_inner()))
                    }
                });
                Ok(endpoint.connect_with_connector_lazy(connector))
            }
            Some(Proxy::Forward(url)) => Err(Error::config(format!(
                "RPC transport cannot use a '{}' proxy; use socks5:// or socks5h://",
                url.scheme()
            ))),
        }
    }
}

/// Resolve the channel URI, refusing a scheme that contradicts `security`.
fn channel_uri(host: &str, security: &RpcSecurity) -> Result<String, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::config("RPC host is required"));
    }

    match host.split_once("://") {
        None => Ok(format!("{}://{host}", security.scheme())),
        Some((scheme, _)) if scheme == security.scheme() => Ok(host.to_owned()),
        Some((scheme, _)) => Err(Error::config(format!(
            "RPC host scheme '{scheme}' conflicts with {} channel security",
            match security {
                RpcSecurity::Plaintext => "plaintext",
                RpcSecurity::Tls { .. } => "TLS",
            }
        ))),
    }
}

fn socks_address(url: &Url) -> Result<String, Error> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::config("SOCKS proxy URL has no host"))?;
    let port = url.port().unwrap_or(1080);
    Ok(format!("{host}:{port}"))
}

fn socks_credentials(url: &Url) -> Option<(String, String)> {
    if url.username().is_empty() {
        return None;
    }
    Some((
        url.username().to_owned(),
        url.password().unwrap_or_default().to_owned(),
    ))
}

fn dial_target(uri: &Uri) -> io::Result<String> {
    let host = uri
        .host()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "RPC URI has no host"))?;
    let port = uri
        .port_u16()
        .unwrap_or(if uri.scheme_str() == Some("https") { 443 } else { 80 });
    Ok(format!("{host}:{port}"))
}

/// Proxy URL without credentials, for logging.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    let _ = url.set_password(None);
    let _ = url.set_username("");
    url.to_string()
}
