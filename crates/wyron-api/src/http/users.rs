// HTTP user endpoints
//
// User responses arrive as `{ "result": ... }`. Listing defaults are
// applied by `ListUsersOptions::query`.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::http::client::HttpClient;
use crate::http::types::{ResultEnvelope, User};
use crate::list::ListUsersOptions;

impl HttpClient {
    /// `GET /users?limit=&skip=&sort=&order=[&social_id=][&status=][&search=]`
    pub async fn list_users(&self, options: &ListUsersOptions) -> Result<Vec<User>, Error> {
        let envelope: ResultEnvelope<Vec<User>> =
            self.get(&["users"], &options.query()).await?;
        Ok(envelope.result.unwrap_or_default())
    }

    /// `GET /users/{key}`. A `null` result means the user does not exist.
    pub async fn get_user(&self, user_key: &str) -> Result<Option<User>, Error> {
        let envelope: ResultEnvelope<User> = self.get(&["users", user_key], &[]).await?;
        Ok(envelope.result)
    }

    /// `POST /users`
    pub async fn create_user(&self, payload: &(impl Serialize + Sync)) -> Result<Option<User>, Error> {
        debug!("creating user");
        let envelope: ResultEnvelope<User> = self.post(&["users"], Some(payload)).await?;
        Ok(envelope.result)
    }

    /// `PATCH /users/{key}`
    pub async fn edit_user(
        &self,
        user_key: &str,
        payload: &(impl Serialize + Sync),
    ) -> Result<Option<User>, Error> {
        debug!(user_key, "editing user");
        let envelope: ResultEnvelope<User> = self.patch(&["users", user_key], payload).await?;
        Ok(envelope.result)
    }

    /// `DELETE /users/{key}`
    pub async fn delete_user(&self, user_key: &str) -> Result<Value, Error> {
        debug!(user_key, "deleting user");
        self.delete(&["users", user_key]).await
    }

    /// `POST /users/{key}/enable`
    pub async fn enable_user(&self, user_key: &str) -> Result<Value, Error> {
        self.user_action(user_key, "enable").await
    }

    /// `POST /users/{key}/disable`
    pub async fn disable_user(&self, user_key: &str) -> Result<Value, Error> {
        self.user_action(user_key, "disable").await
    }

    /// `POST /users/{key}/reset-usage`
    pub async fn reset_usage(&self, user_key: &str) -> Result<Value, Error> {
        self.user_action(user_key, "reset-usage").await
    }

    /// `GET /users/metrics`
    pub async fn metrics(&self) -> Result<Value, Error> {
        self.get(&["users", "metrics"], &[]).await
    }

    async fn user_action(&self, user_key: &str, action: &str) -> Result<Value, Error> {
        debug!(user_key, action, "user action");
        self.post(&["users", user_key, action], None::<&()>).await
    }
}
