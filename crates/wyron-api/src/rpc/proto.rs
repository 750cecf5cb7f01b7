// RPC wire schema
//
// Hand-written prost messages and unary client stubs for the `wyron`
// package: `AuthService`, `ServerService`, `UserService`. Field tags must
// match the service's .proto; `google.protobuf.Empty` is encoded as `()`.

use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, prost::Message)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MeResponse {
    #[prost(string, tag = "1")]
    pub username: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateAdminRequest {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

// ── Servers ──────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, prost::Message)]
pub struct Interface {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(string, tag = "3")]
    pub subnet: String,
    #[prost(string, tag = "4")]
    pub endpoint: String,
    #[prost(string, tag = "5")]
    pub dns: String,
    #[prost(int32, tag = "6")]
    pub port: i32,
    #[prost(string, tag = "7")]
    pub public_key: String,
    #[prost(int64, tag = "8")]
    pub created_at: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Server {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub address: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub display_name: String,
    #[prost(int64, tag = "5")]
    pub created_at: i64,
    #[prost(message, repeated, tag = "6")]
    pub interfaces: Vec<Interface>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ServerList {
    #[prost(message, repeated, tag = "1")]
    pub servers: Vec<Server>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ServerIdRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateServerRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub address: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub password: String,
    #[prost(string, tag = "5")]
    pub display_name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InterfaceRequest {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub display_name: String,
    #[prost(string, tag = "4")]
    pub endpoint: String,
    #[prost(string, tag = "5")]
    pub dns: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InterfaceResponse {
    #[prost(message, optional, tag = "1")]
    pub interface: Option<Interface>,
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, prost::Message)]
pub struct Peer {
    #[prost(string, tag = "1")]
    pub server_id: String,
    #[prost(string, tag = "2")]
    pub interface: String,
    #[prost(string, tag = "3")]
    pub allowed_address: String,
    #[prost(string, tag = "4")]
    pub private_key: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub user_key: String,
    #[prost(string, tag = "2")]
    pub sub_token: String,
    #[prost(int64, tag = "3")]
    pub social_id: i64,
    #[prost(bool, tag = "4")]
    pub active: bool,
    #[prost(uint64, tag = "5")]
    pub traffic_limit: u64,
    #[prost(uint64, tag = "6")]
    pub usage: u64,
    #[prost(int32, tag = "7")]
    pub duration_seconds: i32,
    #[prost(int64, tag = "8")]
    pub created_at: i64,
    #[prost(int64, tag = "9")]
    pub first_connected_at: i64,
    #[prost(int64, tag = "10")]
    pub last_connected_at: i64,
    #[prost(string, tag = "11")]
    pub created_by: String,
    #[prost(message, repeated, tag = "12")]
    pub peers: Vec<Peer>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListUsersRequest {
    #[prost(int32, tag = "1")]
    pub limit: i32,
    #[prost(int32, tag = "2")]
    pub skip: i32,
    #[prost(string, tag = "3")]
    pub sort: String,
    #[prost(string, tag = "4")]
    pub order: String,
    #[prost(int64, optional, tag = "5")]
    pub social_id: Option<i64>,
    #[prost(string, optional, tag = "6")]
    pub status: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub search: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListUsersResponse {
    #[prost(message, repeated, tag = "1")]
    pub users: Vec<User>,
    #[prost(int64, tag = "2")]
    pub count: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserKeyRequest {
    #[prost(string, tag = "1")]
    pub user_key: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateUserRequest {
    #[prost(int64, optional, tag = "1")]
    pub social_id: Option<i64>,
    #[prost(uint64, tag = "2")]
    pub traffic_limit: u64,
    #[prost(int32, tag = "3")]
    pub duration_seconds: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EditUserRequest {
    #[prost(string, tag = "1")]
    pub user_key: String,
    #[prost(uint64, optional, tag = "2")]
    pub traffic_limit: Option<u64>,
    #[prost(int32, optional, tag = "3")]
    pub duration_seconds: Option<i32>,
    #[prost(int64, optional, tag = "4")]
    pub social_id: Option<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MetricsResponse {
    #[prost(int64, tag = "1")]
    pub total_users: i64,
    #[prost(int64, tag = "2")]
    pub active_users: i64,
    #[prost(int64, tag = "3")]
    pub disabled_users: i64,
    #[prost(uint64, tag = "4")]
    pub total_usage: u64,
}

// ── Client stubs ─────────────────────────────────────────────────────

async fn unary<Req, Resp>(
    grpc: &mut Grpc<Channel>,
    path: &'static str,
    request: Request<Req>,
) -> Result<Response<Resp>, Status>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    grpc.ready()
        .await
        .map_err(|e| Status::unavailable(format!("channel not ready: {e}")))?;
    let codec = ProstCodec::<Req, Resp>::default();
    grpc.unary(request, PathAndQuery::from_static(path), codec)
        .await
}

/// Declares a client over `Channel` with one method per unary RPC.
macro_rules! service_client {
    (
        $(#[$meta:meta])*
        $client:ident, $service:literal {
            $( $method:ident($req:ty) -> $resp:ty = $rpc:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $client {
            inner: Grpc<Channel>,
        }

        impl $client {
            pub fn new(channel: Channel) -> Self {
                Self { inner: Grpc::new(channel) }
            }

            $(
                pub async fn $method(
                    &mut self,
                    request: Request<$req>,
                ) -> Result<Response<$resp>, Status> {
                    unary(&mut self.inner, concat!("/", $service, "/", $rpc), request).await
                }
            )+
        }
    };
}

service_client! {
    /// `wyron.AuthService`
    AuthServiceClient, "wyron.AuthService" {
        login(LoginRequest) -> LoginResponse = "Login";
        me(()) -> MeResponse = "Me";
        create_admin(CreateAdminRequest) -> () = "CreateAdmin";
    }
}

service_client! {
    /// `wyron.ServerService`
    ServerServiceClient, "wyron.ServerService" {
        list(()) -> ServerList = "List";
        get(ServerIdRequest) -> Server = "Get";
        update(UpdateServerRequest) -> Server = "Update";
        delete(ServerIdRequest) -> () = "Delete";
        update_interface(InterfaceRequest) -> InterfaceResponse = "UpdateInterface";
        delete_interface(InterfaceRequest) -> () = "DeleteInterface";
    }
}

service_client! {
    /// `wyron.UserService`
    UserServiceClient, "wyron.UserService" {
        list(ListUsersRequest) -> ListUsersResponse = "List";
        get(UserKeyRequest) -> User = "Get";
        create(CreateUserRequest) -> User = "Create";
        edit(EditUserRequest) -> User = "Edit";
        delete(UserKeyRequest) -> () = "Delete";
        enable(UserKeyRequest) -> () = "Enable";
        disable(UserKeyRequest) -> () = "Disable";
        reset_usage(UserKeyRequest) -> () = "ResetUsage";
        revoke_sub_token(UserKeyRequest) -> User = "RevokeSubToken";
        metrics(()) -> MetricsResponse = "Metrics";
    }
}
