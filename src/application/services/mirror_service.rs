use crate::application::ports::mirror_store::MirrorStore;
use crate::domain::entities::offline::{MirrorRecord, MirrorRecordDraft, MirrorReplaceReport};
use crate::domain::value_objects::offline::EntityId;
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::Arc;

/// Read-only local copy of server data, refreshed by wholesale replacement.
pub struct MirrorService {
    store: Arc<dyn MirrorStore>,
}

impl MirrorService {
    pub fn new(store: Arc<dyn MirrorStore>) -> Self {
        Self { store }
    }

    pub async fn bulk_replace(
        &self,
        records: Vec<MirrorRecordDraft>,
    ) -> Result<MirrorReplaceReport, AppError> {
        let report = self.store.bulk_replace(records).await?;
        tracing::info!(
            target: "offline::mirror",
            stored = report.stored,
            dropped = report.dropped,
            "mirror refreshed"
        );
        Ok(report)
    }

    /// Accepts a raw server listing. Records without a usable id count as dropped.
    pub async fn replace_from_server(
        &self,
        values: Vec<Value>,
    ) -> Result<MirrorReplaceReport, AppError> {
        let mut drafts = Vec::with_capacity(values.len());
        let mut malformed = 0usize;
        for value in values {
            match MirrorRecordDraft::from_server_value(value) {
                Ok(draft) => drafts.push(draft),
                Err(reason) => {
                    malformed += 1;
                    tracing::warn!(target: "offline::mirror", %reason, "skipping server record");
                }
            }
        }

        let mut report = self.bulk_replace(drafts).await?;
        report.dropped += malformed;
        Ok(report)
    }

    pub async fn read(&self, id: &EntityId) -> Result<Option<MirrorRecord>, AppError> {
        self.store.read(id).await
    }

    pub async fn list(&self) -> Result<Vec<MirrorRecord>, AppError> {
        self.store.list().await
    }
}
