// Authenticated session shared by both transports.
//
// The token lives behind a reader/writer lock. Logins run under a separate
// async mutex, so concurrent callers that all see an expired token end up
// sharing one login instead of each issuing their own.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Error;

/// Username/password pair, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Both fields must be non-empty.
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, Error> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(Error::config("username is required"));
        }
        if password.expose_secret().is_empty() {
            return Err(Error::config("password is required"));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// The transport-specific half of a login: exchange credentials for a token.
///
/// Implemented once per transport. Everything else about the session
/// (storage, serialization of logins, retry) is transport-agnostic.
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        credentials: &Credentials,
        deadline: Instant,
    ) -> impl Future<Output = Result<SecretString, Error>> + Send;
}

#[derive(Default)]
struct TokenState {
    token: Option<SecretString>,
    /// Bumped on every stored token. Lets a caller tell whether the token
    /// it was rejected with has already been replaced.
    generation: u64,
}

/// Token as seen by one call attempt.
pub(crate) struct TokenSnapshot {
    pub(crate) token: Option<SecretString>,
    pub(crate) generation: u64,
    pub(crate) login_epoch: u64,
}

/// Result of the most recent completed login, guarded by the login mutex.
#[derive(Default)]
struct LoginRecord {
    epoch: u64,
    failure: Option<String>,
}

/// Token holder plus login coordination for one client instance.
pub struct Session<A> {
    authenticator: A,
    credentials: Credentials,
    timeout: Duration,
    state: RwLock<TokenState>,
    login: Mutex<LoginRecord>,
    /// Mirror of `LoginRecord::epoch`, readable without the login mutex.
    login_epoch: AtomicU64,
}

impl<A: Authenticator> Session<A> {
    /// Create a session and perform the initial login.
    ///
    /// There is no unauthenticated session: if this login fails, no
    /// session is produced.
    pub async fn establish(
        authenticator: A,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let session = Self {
            authenticator,
            credentials,
            timeout,
            state: RwLock::new(TokenState::default()),
            login: Mutex::new(LoginRecord::default()),
            login_epoch: AtomicU64::new(0),
        };
        session.login().await?;
        Ok(session)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// The token active right now.
    pub async fn token(&self) -> Option<SecretString> {
        self.state.read().await.token.clone()
    }

    /// Replace the active token.
    pub async fn set_token(&self, token: SecretString) {
        let mut state = self.state.write().await;
        state.token = Some(token);
        state.generation += 1;
    }

    pub(crate) async fn snapshot(&self) -> TokenSnapshot {
        let state = self.state.read().await;
        TokenSnapshot {
            token: state.token.clone(),
            generation: state.generation,
            login_epoch: self.login_epoch.load(Ordering::Acquire),
        }
    }

    /// Log in with the session credentials and store the returned token.
    ///
    /// On failure the previous token is left in place.
    pub async fn login(&self) -> Result<(), Error> {
        let mut record = self.login.lock().await;
        self.login_locked(&mut record, Instant::now() + self.timeout)
            .await
    }

    /// Re-authenticate after the token in `stale` was rejected.
    ///
    /// If another caller completed a login since `stale` was taken, its
    /// outcome (success or failure) is reused instead of logging in again.
    pub(crate) async fn refresh(&self, stale: &TokenSnapshot, deadline: Instant) -> Result<(), Error> {
        let mut record = self.login.lock().await;

        if record.epoch != stale.login_epoch {
            debug!("reusing login completed by a concurrent call");
            return match &record.failure {
                None => Ok(()),
                Some(message) => Err(Error::Authentication {
                    message: message.clone(),
                }),
            };
        }

        if self.state.read().await.generation != stale.generation {
            debug!("token already replaced; skipping login");
            return Ok(());
        }

        self.login_locked(&mut record, deadline).await
    }

    async fn login_locked(&self, record: &mut LoginRecord, deadline: Instant) -> Result<(), Error> {
        debug!(username = %self.credentials.username(), "logging in");

        let exchange = self.authenticator.authenticate(&self.credentials, deadline);
        let outcome = match tokio::time::timeout_at(deadline, exchange).await {
            Ok(Ok(token)) if token.expose_secret().is_empty() => {
                Err("login response carried no token".to_owned())
            }
            Ok(Ok(token)) => Ok(token),
            // A cancelled login says nothing about the credentials; leave
            // the record alone so the next caller tries again.
            Ok(Err(Error::Cancelled)) => return Err(Error::Cancelled),
            Ok(Err(Error::Authentication { message })) => Err(message),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("login timed out after {:?}", self.timeout)),
        };

        record.epoch += 1;
        record.failure = outcome.as_ref().err().cloned();

        // Token and epoch change under one write lock, so a snapshot never
        // pairs the new token with the previous epoch.
        let outcome = {
            let mut state = self.state.write().await;
            let outcome = outcome.map(|token| {
                state.token = Some(token);
                state.generation += 1;
            });
            self.login_epoch.store(record.epoch, Ordering::Release);
            outcome
        };

        match outcome {
            Ok(()) => {
                debug!("login successful");
                Ok(())
            }
            Err(message) => {
                warn!(%message, "login failed");
                Err(Error::Authentication { message })
            }
        }
    }
}
