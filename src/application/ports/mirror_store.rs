use crate::domain::entities::offline::{MirrorRecord, MirrorRecordDraft, MirrorReplaceReport};
use crate::domain::value_objects::offline::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn bulk_replace(
        &self,
        records: Vec<MirrorRecordDraft>,
    ) -> Result<MirrorReplaceReport, AppError>;
    async fn read(&self, id: &EntityId) -> Result<Option<MirrorRecord>, AppError>;
    async fn list(&self) -> Result<Vec<MirrorRecord>, AppError>;
}
