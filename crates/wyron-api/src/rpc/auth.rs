// RPC auth operations

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::RpcClient;
use crate::rpc::proto::{AuthServiceClient, CreateAdminRequest};

impl RpcClient {
    /// Username behind the current token. `AuthService/Me`
    pub async fn me(&self) -> Result<String, Error> {
        let response = self
            .unary("AuthService/Me", (), |request| {
                let mut client = AuthServiceClient::new(self.channel());
                async move { client.me(request).await }
            })
            .await?;
        Ok(response.username)
    }

    /// Create another administrator account. `AuthService/CreateAdmin`
    pub async fn create_admin(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "creating admin");
        let message = CreateAdminRequest {
            username: username.to_owned(),
            password: password.expose_secret().to_owned(),
        };
        self.unary("AuthService/CreateAdmin", message, |request| {
            let mut client = AuthServiceClient::new(self.channel());
            async move { client.create_admin(request).await }
        })
        .await
    }
}
