use super::mappers::mirror_record_from_row;
use super::rows::MirrorRecordRow;
use crate::application::ports::mirror_store::MirrorStore;
use crate::domain::entities::offline::{MirrorRecord, MirrorRecordDraft, MirrorReplaceReport};
use crate::domain::value_objects::offline::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteMirrorStore {
    pool: SqlitePool,
}

impl SqliteMirrorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn upsert_record(
        conn: &mut sqlx::SqliteConnection,
        record: &MirrorRecordDraft,
        stamped_at: i64,
    ) -> Result<(), AppError> {
        let fields = serde_json::to_string(&record.fields)?;
        sqlx::query(
            r#"
            INSERT INTO mirror_records (id, fields, is_from_server, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(id) DO UPDATE SET
                fields = excluded.fields,
                is_from_server = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.as_str())
        .bind(&fields)
        .bind(stamped_at)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MirrorStore for SqliteMirrorStore {
    async fn bulk_replace(
        &self,
        records: Vec<MirrorRecordDraft>,
    ) -> Result<MirrorReplaceReport, AppError> {
        // store unavailable is the only failure the caller sees
        let mut conn = self.pool.acquire().await?;
        let stamped_at = Utc::now().timestamp_millis();
        let mut report = MirrorReplaceReport::default();

        for record in &records {
            match Self::upsert_record(&mut conn, record, stamped_at).await {
                Ok(()) => report.stored += 1,
                Err(err) => {
                    report.dropped += 1;
                    tracing::warn!(
                        target: "offline::mirror",
                        id = %record.id,
                        error = %err,
                        "dropping mirror record that failed to persist"
                    );
                }
            }
        }

        tracing::debug!(
            target: "offline::mirror",
            stored = report.stored,
            dropped = report.dropped,
            "mirror refreshed from server"
        );
        Ok(report)
    }

    async fn read(&self, id: &EntityId) -> Result<Option<MirrorRecord>, AppError> {
        let row = sqlx::query_as::<_, MirrorRecordRow>(
            "SELECT id, fields, is_from_server, updated_at FROM mirror_records WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(mirror_record_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<MirrorRecord>, AppError> {
        let rows = sqlx::query_as::<_, MirrorRecordRow>(
            "SELECT id, fields, is_from_server, updated_at FROM mirror_records ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(mirror_record_from_row).collect()
    }
}
