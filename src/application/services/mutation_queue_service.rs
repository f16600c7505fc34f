use crate::application::ports::queue_store::MutationQueueStore;
use crate::domain::entities::offline::{QueueEntry, QueueStatusSnapshot};
use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Entry point for local writes. Validates raw input before it reaches the store.
pub struct MutationQueueService {
    store: Arc<dyn MutationQueueStore>,
}

impl MutationQueueService {
    pub fn new(store: Arc<dyn MutationQueueStore>) -> Self {
        Self { store }
    }

    pub async fn enqueue(
        &self,
        id: &str,
        kind: DocumentKind,
        payload: Value,
    ) -> Result<QueueEntry, AppError> {
        let id = EntityId::new(id.to_string()).map_err(AppError::ValidationError)?;
        let payload = MutationPayload::new(payload).map_err(AppError::ValidationError)?;
        self.enqueue_validated(&id, kind, &payload).await
    }

    pub async fn enqueue_validated(
        &self,
        id: &EntityId,
        kind: DocumentKind,
        payload: &MutationPayload,
    ) -> Result<QueueEntry, AppError> {
        let entry = self.store.enqueue(id, kind, payload).await?;
        tracing::info!(
            target: "offline::queue",
            id = %entry.id,
            kind = %entry.kind,
            updated_at = entry.updated_at,
            "mutation queued"
        );
        Ok(entry)
    }

    pub async fn list_pending(&self) -> Result<Vec<QueueEntry>, AppError> {
        self.store.list_pending().await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Option<QueueEntry>, AppError> {
        self.store.get(id).await
    }

    pub async fn mark_synced(&self, id: &EntityId) -> Result<(), AppError> {
        self.store.mark_synced(id).await
    }

    pub async fn status(&self) -> Result<QueueStatusSnapshot, AppError> {
        self.store.status_snapshot().await
    }

    pub async fn prune_synced(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let removed = self.store.prune_synced(older_than).await?;
        if removed > 0 {
            tracing::info!(target: "offline::queue", removed, "pruned synced entries");
        }
        Ok(removed)
    }
}
