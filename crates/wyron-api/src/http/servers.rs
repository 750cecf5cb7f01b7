// HTTP server and interface endpoints
//
// Server responses arrive as `{ "data": ... }`. Mutations answer with
// whatever the service chooses to echo, so they are returned as raw JSON.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::http::client::HttpClient;
use crate::http::types::{DataEnvelope, Server};

impl HttpClient {
    /// `GET /servers`
    pub async fn list_servers(&self) -> Result<Vec<Server>, Error> {
        let envelope: DataEnvelope<Vec<Server>> = self.get(&["servers"], &[]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /servers/{id}`. A `null` payload means the server does not exist.
    pub async fn get_server(&self, server_id: &str) -> Result<Option<Server>, Error> {
        let envelope: DataEnvelope<Server> = self.get(&["servers", server_id], &[]).await?;
        Ok(envelope.data)
    }

    /// `POST /servers`. Creates the server or updates it if the id exists.
    pub async fn create_or_update_server(
        &self,
        payload: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        debug!("creating or updating server");
        self.post(&["servers"], Some(payload)).await
    }

    /// `DELETE /servers/{id}`
    pub async fn delete_server(&self, server_id: &str) -> Result<Value, Error> {
        debug!(server_id, "deleting server");
        self.delete(&["servers", server_id]).await
    }

    /// `POST /servers/{id}/interfaces`
    pub async fn update_interface(
        &self,
        server_id: &str,
        payload: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        debug!(server_id, "updating interface");
        self.post(&["servers", server_id, "interfaces"], Some(payload))
            .await
    }

    /// `DELETE /servers/{id}/interfaces/{name}`
    pub async fn delete_interface(&self, server_id: &str, name: &str) -> Result<Value, Error> {
        debug!(server_id, interface = name, "deleting interface");
        self.delete(&["servers", server_id, "interfaces", name]).await
    }
}
