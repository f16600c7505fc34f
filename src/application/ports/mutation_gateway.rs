use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rejected by remote: {message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayAck {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub id: EntityId,
    pub message: Option<String>,
}

/// Remote write endpoints. Both calls must be idempotent on the entity id.
#[async_trait]
pub trait MutationGateway: Send + Sync {
    async fn upsert(
        &self,
        kind: DocumentKind,
        id: &EntityId,
        payload: &MutationPayload,
    ) -> Result<GatewayAck, GatewayError>;

    /// Only used for kinds whose delivery mode is `Create`; the id is caller-supplied.
    async fn create(
        &self,
        id: &EntityId,
        payload: &MutationPayload,
    ) -> Result<CreatedDocument, GatewayError>;
}
