// Resilient call wrapper
//
// Every remote operation runs through `Session::call_with`: one deadline
// for the whole call, the current token attached to each attempt, and
// exactly one re-login plus one retry when (and only when) the remote
// side rejects the token. Every other failure is returned untouched.

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Error;
use crate::session::{Authenticator, Session};

/// Caller-supplied call options.
///
/// A deadline set here replaces the session's default timeout. An already
/// expired deadline fails the call immediately rather than being extended.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// What one attempt of an operation runs with.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub(crate) token: Option<SecretString>,
    pub(crate) deadline: Instant,
}

impl Attempt {
    /// The token current when the attempt started. `None` only before the
    /// first login.
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the call deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl<A: Authenticator> Session<A> {
    /// Run `op` with the session's default timeout and no cancellation.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: Fn(Attempt) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        self.call_with(&CallContext::default(), op).await
    }

    /// Run `op` under the retry-once-on-auth-expiry policy.
    ///
    /// `op` is invoked at most twice. The deadline covers both attempts and
    /// the login between them. Cancellation wins over everything, including
    /// an in-flight re-login.
    pub async fn call_with<T, F, Fut>(&self, ctx: &CallContext, op: F) -> Result<T, Error>
    where
        F: Fn(Attempt) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let now = Instant::now();
        let deadline = match ctx.deadline {
            Some(deadline) if deadline <= now => {
                return Err(Error::Timeout {
                    after: Duration::ZERO,
                });
            }
            Some(deadline) => deadline,
            None => now + self.timeout(),
        };
        let budget = deadline - now;

        let bounded = async {
            match tokio::time::timeout_at(deadline, self.attempt_twice(deadline, &op)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout { after: budget }),
            }
        };

        match &ctx.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(Error::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    async fn attempt_twice<T, F, Fut>(&self, deadline: Instant, op: &F) -> Result<T, Error>
    where
        F: Fn(Attempt) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        // Attempt 1.
        let first = self.snapshot().await;
        let attempt = Attempt {
            token: first.token.clone(),
            deadline,
        };
        let rejected = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_auth_expired() => e,
            Err(e) => return Err(e),
        };

        debug!(error = %rejected, "token rejected; re-authenticating before the single retry");
        self.refresh(&first, deadline).await?;

        // Attempt 2. Its outcome is final.
        let second = self.snapshot().await;
        op(Attempt {
            token: second.token,
            deadline,
        })
        .await
    }
}
