// RPC user operations

use tracing::debug;

use crate::error::Error;
use crate::list::ListUsersOptions;
use crate::rpc::client::RpcClient;
use crate::rpc::proto::{
    CreateUserRequest, EditUserRequest, ListUsersRequest, ListUsersResponse, MetricsResponse,
    User, UserKeyRequest, UserServiceClient,
};

impl From<&ListUsersOptions> for ListUsersRequest {
    fn from(options: &ListUsersOptions) -> Self {
        Self {
            limit: i32::try_from(options.limit()).unwrap_or(i32::MAX),
            skip: i32::try_from(options.skip).unwrap_or(i32::MAX),
            sort: options.sort().to_owned(),
            order: options.order().to_string(),
            social_id: options.social_id,
            status: options.status().map(str::to_owned),
            search: options.search().map(str::to_owned),
        }
    }
}

fn key(user_key: &str) -> UserKeyRequest {
    UserKeyRequest {
        user_key: user_key.to_owned(),
    }
}

impl RpcClient {
    /// `UserService/List`. Returns the page plus the service's total count.
    pub async fn list_users(&self, options: &ListUsersOptions) -> Result<ListUsersResponse, Error> {
        self.unary("UserService/List", ListUsersRequest::from(options), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.list(request).await }
        })
        .await
    }

    /// `UserService/Get`
    pub async fn get_user(&self, user_key: &str) -> Result<User, Error> {
        self.unary("UserService/Get", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.get(request).await }
        })
        .await
    }

    /// `UserService/Create`
    pub async fn create_user(&self, message: CreateUserRequest) -> Result<User, Error> {
        debug!("creating user");
        self.unary("UserService/Create", message, |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.create(request).await }
        })
        .await
    }

    /// `UserService/Edit`
    pub async fn edit_user(&self, message: EditUserRequest) -> Result<User, Error> {
        debug!(user_key = %message.user_key, "editing user");
        self.unary("UserService/Edit", message, |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.edit(request).await }
        })
        .await
    }

    /// `UserService/Delete`
    pub async fn delete_user(&self, user_key: &str) -> Result<(), Error> {
        debug!(user_key, "deleting user");
        self.unary("UserService/Delete", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.delete(request).await }
        })
        .await
    }

    /// `UserService/Enable`
    pub async fn enable_user(&self, user_key: &str) -> Result<(), Error> {
        self.unary("UserService/Enable", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.enable(request).await }
        })
        .await
    }

    /// `UserService/Disable`
    pub async fn disable_user(&self, user_key: &str) -> Result<(), Error> {
        self.unary("UserService/Disable", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.disable(request).await }
        })
        .await
    }

    /// `UserService/ResetUsage`
    pub async fn reset_usage(&self, user_key: &str) -> Result<(), Error> {
        self.unary("UserService/ResetUsage", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.reset_usage(request).await }
        })
        .await
    }

    /// Issue a fresh subscription token. `UserService/RevokeSubToken`
    pub async fn revoke_sub_token(&self, user_key: &str) -> Result<User, Error> {
        debug!(user_key, "revoking subscription token");
        self.unary("UserService/RevokeSubToken", key(user_key), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.revoke_sub_token(request).await }
        })
        .await
    }

    /// `UserService/Metrics`
    pub async fn metrics(&self) -> Result<MetricsResponse, Error> {
        self.unary("UserService/Metrics", (), |request| {
            let mut client = UserServiceClient::new(self.channel());
            async move { client.metrics(request).await }
        })
        .await
    }
}
