//! HTTP backend speaking the Authorization Service REST protocol.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use trove_core::config::authz::AuthzConfig;

use crate::error::GatewayError;
use crate::tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};

use super::TupleBackend;

/// Client for the external tuple store.
///
/// Every call carries the configured timeout so an unreachable service
/// surfaces as `Unavailable` instead of hanging the request.
#[derive(Debug, Clone)]
pub struct HttpTupleBackend {
    client: reqwest::Client,
    api_url: String,
    store_id: String,
    model_id: String,
}

#[derive(Debug, Serialize)]
struct WireTuple {
    user: String,
    relation: String,
    object: String,
}

impl From<&RelationTuple> for WireTuple {
    fn from(tuple: &RelationTuple) -> Self {
        Self {
            user: tuple.subject.to_string(),
            relation: tuple.relation.to_string(),
            object: tuple.object.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WriteRequest {
    tuples: Vec<WireTuple>,
    #[serde(skip_serializing_if = "String::is_empty")]
    authorization_model_id: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    writes: Vec<WriteAck>,
}

#[derive(Debug, Deserialize)]
struct WriteAck {
    success: bool,
}

#[derive(Debug, Serialize)]
struct CheckRequest {
    user: String,
    relation: String,
    object: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    allowed: bool,
}

#[derive(Debug, Serialize)]
struct ListObjectsRequest {
    user: String,
    relation: String,
    #[serde(rename = "type")]
    object_type: String,
}

#[derive(Debug, Deserialize)]
struct ListObjectsResponse {
    objects: Vec<String>,
}

impl HttpTupleBackend {
    /// Build a client from configuration.
    pub fn new(config: &AuthzConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            store_id: config.store_id.clone(),
            model_id: config.model_id.clone(),
        })
    }

    fn store_url(&self, path: &str) -> String {
        format!("{}/stores/{}/{path}", self.api_url, self.store_id)
    }

    /// Map a transport error to the gateway taxonomy.
    fn transport_error(err: reqwest::Error) -> GatewayError {
        GatewayError::Unavailable(err.to_string())
    }

    /// Map a non-success status to the gateway taxonomy.
    async fn status_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                GatewayError::InvalidRequest(body)
            }
            _ => GatewayError::Unavailable(format!("{status}: {body}")),
        }
    }
}

#[async_trait]
impl TupleBackend for HttpTupleBackend {
    async fn ready(&self) -> Result<(), GatewayError> {
        let url = self.store_url("authorization-models");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        debug!(store_id = %self.store_id, "Authorization model probe succeeded");
        Ok(())
    }

    async fn write(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
        let body = WriteRequest {
            tuples: vec![tuple.into()],
            authorization_model_id: self.model_id.clone(),
        };

        let response = self
            .client
            .post(self.store_url("write"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let acks: WriteResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("malformed write response: {e}")))?;

        if acks.writes.iter().any(|ack| !ack.success) {
            return Err(GatewayError::InvalidRequest(format!(
                "write rejected for tuple '{tuple}'"
            )));
        }
        Ok(())
    }

    async fn delete(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
        let body = WriteRequest {
            tuples: vec![tuple.into()],
            authorization_model_id: self.model_id.clone(),
        };

        let response = self
            .client
            .post(self.store_url("delete"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }

    async fn check(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object: &ObjectRef,
    ) -> Result<bool, GatewayError> {
        let body = CheckRequest {
            user: subject.to_string(),
            relation: relation.to_string(),
            object: object.to_string(),
        };

        let response = self
            .client
            .post(self.store_url("check"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let decision: CheckResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("malformed check response: {e}")))?;
        Ok(decision.allowed)
    }

    async fn list_objects(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object_type: ObjectType,
    ) -> Result<Vec<ObjectRef>, GatewayError> {
        let body = ListObjectsRequest {
            user: subject.to_string(),
            relation: relation.to_string(),
            object_type: object_type.to_string(),
        };

        let response = self
            .client
            .post(self.store_url("list-objects"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let listing: ListObjectsResponse = response.json().await.map_err(|e| {
            GatewayError::Unavailable(format!("malformed list-objects response: {e}"))
        })?;

        listing
            .objects
            .iter()
            .map(|raw| {
                raw.parse::<ObjectRef>()
                    .map_err(|e| GatewayError::InvalidRequest(e.message))
            })
            .collect()
    }
}
