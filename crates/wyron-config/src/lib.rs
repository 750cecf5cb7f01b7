//! Profile-based configuration for Wyron API clients.
//!
//! TOML profiles layered with `WYRON_` environment overrides, password
//! resolution (env var, system keyring, plaintext), and translation into
//! `wyron_core::ClientConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wyron_core::{Client, ClientConfig, CoreError, RpcSecurity};

/// Profile used when neither the caller nor the file names one.
pub const DEFAULT_PROFILE: &str = "default";

const KEYRING_SERVICE: &str = "wyron";
const ENV_PREFIX: &str = "WYRON_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is requested explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Proxy applied to profiles that do not set their own.
    pub proxy: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

fn default_timeout() -> u64 {
    15
}

/// Which API surface a profile talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Rpc,
}

/// A named service profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub transport: Transport,

    /// Base URL for HTTP (`https://vpn.example.com`), `host:port` for RPC.
    pub address: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer `password_env` or the keyring.
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    /// Overrides `defaults.proxy`.
    pub proxy: Option<String>,

    /// Use TLS on the RPC channel.
    #[serde(default)]
    pub tls: bool,

    /// PEM CA certificate for the RPC channel. Implies `tls`.
    pub ca_cert: Option<PathBuf>,

    /// Server name checked against the RPC certificate.
    pub tls_domain: Option<String>,

    /// Overrides `defaults.timeout`, in seconds.
    pub timeout: Option<u64>,
}

impl Config {
    /// Select a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE);
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::validation("profile", format!("no profile named '{name}'")))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wyron", "wyron").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("wyron");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file, then `WYRON_` environment variables.
///
/// Nested keys use a double underscore:
/// `WYRON_PROFILES__PROD__ADDRESS=https://vpn.example.com`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical path and environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading configuration");
    Ok(figment(path).extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name).ok()?.get_password().ok()
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve a profile's password.
///
/// Order: the variable named by `password_env`, the system keyring,
/// then the plaintext `password` field.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, keyring_password)
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    keyring: impl FnOnce(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var named by the profile
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            debug!(profile = profile_name, source = "env", "password resolved");
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring(profile_name) {
        debug!(profile = profile_name, source = "keyring", "password resolved");
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        debug!(profile = profile_name, source = "config", "password resolved");
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    build_client_config(profile, profile_name, defaults, password)
}

fn build_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let username = profile
        .username
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let address = profile.address.trim();
    if address.is_empty() {
        return Err(ConfigError::validation("address", "must not be empty"));
    }

    let mut config = match profile.transport {
        Transport::Http => {
            let url: url::Url = address
                .parse()
                .map_err(|_| ConfigError::validation("address", format!("invalid URL: {address}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::validation(
                    "address",
                    format!("expected an http or https URL, got '{address}'"),
                ));
            }
            if profile.tls || profile.ca_cert.is_some() || profile.tls_domain.is_some() {
                return Err(ConfigError::validation(
                    "tls",
                    "TLS settings apply to the rpc transport only; use an https address",
                ));
            }
            ClientConfig::http(address, username, password)
        }
        Transport::Rpc => {
            if address.contains("://") {
                return Err(ConfigError::validation(
                    "address",
                    format!("expected host:port for the rpc transport, got '{address}'"),
                ));
            }
            ClientConfig::rpc(address, username, password).with_security(rpc_security(profile))
        }
    };

    if let Some(proxy) = profile.proxy.as_ref().or(defaults.proxy.as_ref()) {
        config = config.with_proxy(proxy.clone());
    }
    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    Ok(config.with_timeout(Duration::from_secs(timeout)))
}

fn rpc_security(profile: &Profile) -> RpcSecurity {
    if profile.tls || profile.ca_cert.is_some() {
        RpcSecurity::Tls {
            ca_certificate: profile.ca_cert.clone(),
            domain: profile.tls_domain.clone(),
        }
    } else {
        RpcSecurity::Plaintext
    }
}

/// Select a profile, resolve its credentials and log in.
pub async fn connect(config: &Config, profile_name: Option<&str>) -> Result<Client, ConfigError> {
    let (name, profile) = config.profile(profile_name)?;
    let client_config = profile_to_client_config(profile, name, &config.defaults)?;
    debug!(profile = name, transport = ?profile.transport, "connecting");
    Ok(Client::connect(client_config).await?)
}
