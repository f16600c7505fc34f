use super::mappers::{payload_to_json, queue_entry_from_row, queue_status_from_row};
use super::rows::{QueueCountsRow, QueueEntryRow};
use crate::application::ports::queue_store::MutationQueueStore;
use crate::domain::entities::offline::{QueueEntry, QueueStatusSnapshot};
use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const ENTRY_COLUMNS: &str =
    "id, kind, payload, status, updated_at, attempt_count, last_error, synced_at";

pub struct SqliteMutationQueueStore {
    pool: SqlitePool,
}

impl SqliteMutationQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MutationQueueStore for SqliteMutationQueueStore {
    async fn enqueue(
        &self,
        id: &EntityId,
        kind: DocumentKind,
        payload: &MutationPayload,
    ) -> Result<QueueEntry, AppError> {
        let payload_json = payload_to_json(payload)?;
        let now = Utc::now().timestamp_millis();

        // updated_at = max(now, queue max + 1) keeps it strictly increasing
        let row = sqlx::query_as::<_, QueueEntryRow>(&format!(
            r#"
            INSERT INTO queue_entries (
                id, kind, payload, status, updated_at, attempt_count, last_error, synced_at
            ) VALUES (
                ?1, ?2, ?3, 'pending',
                MAX(?4, (SELECT COALESCE(MAX(updated_at), 0) + 1 FROM queue_entries)),
                0, NULL, NULL
            )
            ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                payload = excluded.payload,
                status = 'pending',
                updated_at = excluded.updated_at,
                attempt_count = 0,
                last_error = NULL,
                synced_at = NULL
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(kind.as_str())
        .bind(&payload_json)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let entry = queue_entry_from_row(row)?;
        tracing::debug!(
            target: "offline::queue",
            id = %entry.id,
            kind = %entry.kind,
            revision = entry.updated_at,
            "mutation enqueued"
        );
        Ok(entry)
    }

    async fn get(&self, id: &EntityId) -> Result<Option<QueueEntry>, AppError> {
        let row = sqlx::query_as::<_, QueueEntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE id = ?1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(queue_entry_from_row).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<QueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, QueueEntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS} FROM queue_entries
            WHERE status = 'pending'
            ORDER BY updated_at ASC, id ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        // an unreadable row must not hold back the rest of the queue
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            match queue_entry_from_row(row) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(
                    target: "offline::queue",
                    id = %row_id,
                    error = %err,
                    "skipping unreadable pending entry"
                ),
            }
        }
        Ok(entries)
    }

    async fn mark_synced(&self, id: &EntityId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE queue_entries
            SET status = 'synced', synced_at = ?1
            WHERE id = ?2 AND status = 'pending'
            "#,
        )
        .bind(Utc::now().timestamp_millis())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn acknowledge(&self, id: &EntityId, revision: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET status = 'synced', synced_at = ?1
            WHERE id = ?2 AND updated_at = ?3 AND status = 'pending'
            "#,
        )
        .bind(Utc::now().timestamp_millis())
        .bind(id.as_str())
        .bind(revision)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_failure(
        &self,
        id: &EntityId,
        revision: i64,
        message: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE queue_entries
            SET attempt_count = attempt_count + 1, last_error = ?1
            WHERE id = ?2 AND updated_at = ?3 AND status = 'pending'
            "#,
        )
        .bind(message)
        .bind(id.as_str())
        .bind(revision)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn status_snapshot(&self) -> Result<QueueStatusSnapshot, AppError> {
        let row = sqlx::query_as::<_, QueueCountsRow>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                COALESCE(SUM(CASE WHEN status = 'synced' THEN 1 ELSE 0 END), 0) AS synced,
                MIN(CASE WHEN status = 'pending' THEN updated_at END) AS oldest_pending_at
            FROM queue_entries
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(queue_status_from_row(row))
    }

    async fn prune_synced(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM queue_entries
            WHERE status = 'synced' AND synced_at IS NOT NULL AND synced_at < ?1
            "#,
        )
        .bind(older_than.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected();
        tracing::debug!(target: "offline::queue", removed, "pruned synced queue entries");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::offline::QueueStatus;
    use crate::infrastructure::database::ConnectionPool;
    use chrono::Duration;
    use serde_json::json;

    async fn setup_store() -> (SqliteMutationQueueStore, ConnectionPool) {
        let pool = ConnectionPool::in_memory().await.unwrap();
        (SqliteMutationQueueStore::new(pool.get_pool().clone()), pool)
    }

    fn id(value: &str) -> EntityId {
        EntityId::new(value.into()).unwrap()
    }

    fn payload(value: serde_json::Value) -> MutationPayload {
        MutationPayload::new(value).unwrap()
    }

    #[tokio::test]
    async fn repeated_enqueue_keeps_one_entry_with_last_payload() {
        let (store, pool) = setup_store().await;

        for total in [100, 200, 300] {
            store
                .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": total})))
                .await
                .unwrap();
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM queue_entries")
            .fetch_one(pool.get_pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let entry = store.get(&id("A1")).await.unwrap().unwrap();
        assert_eq!(entry.payload.as_map()["total"], 300);
        assert_eq!(entry.status, QueueStatus::Pending);
    }

    #[tokio::test]
    async fn updated_at_is_strictly_increasing() {
        let (store, _pool) = setup_store().await;

        let mut last = i64::MIN;
        for n in 0..20 {
            let entry = store
                .enqueue(&id(&format!("E{n}")), DocumentKind::Receipt, &payload(json!({})))
                .await
                .unwrap();
            assert!(entry.updated_at > last);
            last = entry.updated_at;
        }

        let again = store
            .enqueue(&id("E0"), DocumentKind::Receipt, &payload(json!({"amount": 1})))
            .await
            .unwrap();
        assert!(again.updated_at > last);
    }

    #[tokio::test]
    async fn mark_synced_is_idempotent_and_ignores_missing_ids() {
        let (store, _pool) = setup_store().await;
        store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 1})))
            .await
            .unwrap();

        store.mark_synced(&id("A1")).await.unwrap();
        store.mark_synced(&id("A1")).await.unwrap();
        store.mark_synced(&id("missing")).await.unwrap();

        let entry = store.get(&id("A1")).await.unwrap().unwrap();
        assert_eq!(entry.status, QueueStatus::Synced);
        assert!(entry.synced_at.is_some());
        assert!(store.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn re_enqueue_resurrects_synced_entry() {
        let (store, _pool) = setup_store().await;
        let first = store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 1})))
            .await
            .unwrap();
        store
            .record_failure(&id("A1"), first.revision(), "timeout")
            .await
            .unwrap();
        store.mark_synced(&id("A1")).await.unwrap();

        let entry = store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 2})))
            .await
            .unwrap();

        assert_eq!(entry.status, QueueStatus::Pending);
        assert_eq!(entry.attempt_count, 0);
        assert!(entry.last_error.is_none());
        assert!(entry.synced_at.is_none());
        assert_eq!(store.list_pending().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn acknowledge_skips_entries_replaced_after_listing() {
        let (store, _pool) = setup_store().await;
        let listed = store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 1})))
            .await
            .unwrap();
        store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 2})))
            .await
            .unwrap();

        let flipped = store.acknowledge(&id("A1"), listed.revision()).await.unwrap();
        assert!(!flipped);

        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payload.as_map()["total"], 2);
    }

    #[tokio::test]
    async fn list_pending_skips_unreadable_rows() {
        let (store, pool) = setup_store().await;
        store
            .enqueue(&id("GOOD"), DocumentKind::Report, &payload(json!({"total": 1})))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO queue_entries (id, kind, payload, status, updated_at) \
             VALUES ('BAD', 'INVOICE', '{}', 'pending', 1)",
        )
        .execute(pool.get_pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO queue_entries (id, kind, payload, status, updated_at) \
             VALUES ('BROKEN', 'REPORT', 'not json', 'pending', 2)",
        )
        .execute(pool.get_pool())
        .await
        .unwrap();

        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id("GOOD"));
    }

    #[tokio::test]
    async fn record_failure_keeps_entry_pending() {
        let (store, _pool) = setup_store().await;
        let entry = store
            .enqueue(&id("R1"), DocumentKind::PersonnelRoster, &payload(json!({"name": "x"})))
            .await
            .unwrap();

        store
            .record_failure(&id("R1"), entry.revision(), "connection refused")
            .await
            .unwrap();
        store
            .record_failure(&id("R1"), entry.revision(), "connection reset")
            .await
            .unwrap();

        let entry = store.get(&id("R1")).await.unwrap().unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.attempt_count, 2);
        assert_eq!(entry.last_error.as_deref(), Some("connection reset"));
    }

    #[tokio::test]
    async fn status_snapshot_counts_by_status() {
        let (store, _pool) = setup_store().await;
        let empty = store.status_snapshot().await.unwrap();
        assert_eq!(empty, QueueStatusSnapshot::new(0, 0, None));

        let first = store
            .enqueue(&id("A"), DocumentKind::Report, &payload(json!({})))
            .await
            .unwrap();
        store
            .enqueue(&id("B"), DocumentKind::Report, &payload(json!({})))
            .await
            .unwrap();
        store
            .enqueue(&id("C"), DocumentKind::Report, &payload(json!({})))
            .await
            .unwrap();
        store.mark_synced(&id("C")).await.unwrap();

        let snapshot = store.status_snapshot().await.unwrap();
        assert_eq!(snapshot.pending, 2);
        assert_eq!(snapshot.synced, 1);
        assert_eq!(snapshot.oldest_pending_at, Some(first.updated_at));
    }

    #[tokio::test]
    async fn prune_only_removes_old_synced_entries() {
        let (store, pool) = setup_store().await;
        for name in ["old", "fresh", "pending"] {
            store
                .enqueue(&id(name), DocumentKind::Report, &payload(json!({})))
                .await
                .unwrap();
        }
        store.mark_synced(&id("old")).await.unwrap();
        store.mark_synced(&id("fresh")).await.unwrap();

        let long_ago = (Utc::now() - Duration::days(30)).timestamp_millis();
        sqlx::query("UPDATE queue_entries SET synced_at = ?1 WHERE id = 'old'")
            .bind(long_ago)
            .execute(pool.get_pool())
            .await
            .unwrap();

        let removed = store
            .prune_synced(Utc::now() - Duration::days(7))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&id("old")).await.unwrap().is_none());
        assert!(store.get(&id("fresh")).await.unwrap().is_some());
        assert!(store.get(&id("pending")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn enqueue_fails_loudly_when_store_is_closed() {
        let (store, pool) = setup_store().await;
        pool.close().await;

        let result = store
            .enqueue(&id("A1"), DocumentKind::Report, &payload(json!({"total": 1})))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
