use crate::domain::entities::offline::{QueueEntry, QueueStatusSnapshot};
use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable per-entity queue of writes awaiting delivery.
#[async_trait]
pub trait MutationQueueStore: Send + Sync {
    /// Upserts the entry for `id`, resetting it to pending. Durable once this returns `Ok`.
    async fn enqueue(
        &self,
        id: &EntityId,
        kind: DocumentKind,
        payload: &MutationPayload,
    ) -> Result<QueueEntry, AppError>;
    async fn get(&self, id: &EntityId) -> Result<Option<QueueEntry>, AppError>;
    /// Rows that no longer decode are skipped with a warning, never returned as an error.
    async fn list_pending(&self) -> Result<Vec<QueueEntry>, AppError>;
    /// Absence is not an error.
    async fn mark_synced(&self, id: &EntityId) -> Result<(), AppError>;
    /// Marks synced only if the entry still carries `revision`. Returns whether it flipped.
    async fn acknowledge(&self, id: &EntityId, revision: i64) -> Result<bool, AppError>;
    async fn record_failure(
        &self,
        id: &EntityId,
        revision: i64,
        message: &str,
    ) -> Result<(), AppError>;
    async fn status_snapshot(&self) -> Result<QueueStatusSnapshot, AppError>;
    async fn prune_synced(&self, older_than: DateTime<Utc>) -> Result<u64, AppError>;
}
