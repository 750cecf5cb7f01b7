// RPC server and interface operations

use tracing::debug;

use crate::error::Error;
use crate::rpc::client::RpcClient;
use crate::rpc::proto::{
    Interface, InterfaceRequest, Server, ServerIdRequest, ServerServiceClient,
    UpdateServerRequest,
};

impl RpcClient {
    /// `ServerService/List`
    pub async fn list_servers(&self) -> Result<Vec<Server>, Error> {
        let response = self
            .unary("ServerService/List", (), |request| {
                let mut client = ServerServiceClient::new(self.channel());
                async move { client.list(request).await }
            })
            .await?;
        Ok(response.servers)
    }

    /// `ServerService/Get`
    pub async fn get_server(&self, server_id: &str) -> Result<Server, Error> {
        let message = ServerIdRequest {
            id: server_id.to_owned(),
        };
        self.unary("ServerService/Get", message, |request| {
            let mut client = ServerServiceClient::new(self.channel());
            async move { client.get(request).await }
        })
        .await
    }

    /// `ServerService/Update`. Creates the server if the id is new.
    pub async fn create_or_update_server(&self, message: UpdateServerRequest) -> Result<Server, Error> {
        debug!(server_id = %message.id, "creating or updating server");
        self.unary("ServerService/Update", message, |request| {
            let mut client = ServerServiceClient::new(self.channel());
            async move { client.update(request).await }
        })
        .await
    }

    /// `ServerService/Delete`
    pub async fn delete_server(&self, server_id: &str) -> Result<(), Error> {
        debug!(server_id, "deleting server");
        let message = ServerIdRequest {
            id: server_id.to_owned(),
        };
        self.unary("ServerService/Delete", message, |request| {
            let mut client = ServerServiceClient::new(self.channel());
            async move { client.delete(request).await }
        })
        .await
    }

    /// `ServerService/UpdateInterface`. `None` if the reply carried no
    /// interface.
    pub async fn update_interface(&self, message: InterfaceRequest) -> Result<Option<Interface>, Error> {
        debug!(server_id = %message.server_id, interface = %message.name, "updating interface");
        let response = self
            .unary("ServerService/UpdateInterface", message, |request| {
                let mut client = ServerServiceClient::new(self.channel());
                async move { client.update_interface(request).await }
            })
            .await?;
        Ok(response.interface)
    }

    /// `ServerService/DeleteInterface`
    pub async fn delete_interface(&self, server_id: &str, name: &str) -> Result<(), Error> {
        debug!(server_id, interface = name, "deleting interface");
        let message = InterfaceRequest {
            server_id: server_id.to_owned(),
            name: name.to_owned(),
            ..InterfaceRequest::default()
        };
        self.unary("ServerService/DeleteInterface", message, |request| {
            let mut client = ServerServiceClient::new(self.channel());
            async move { client.delete_interface(request).await }
        })
        .await
    }
}
