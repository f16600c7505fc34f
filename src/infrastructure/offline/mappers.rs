use super::rows::{MirrorRecordRow, QueueCountsRow, QueueEntryRow};
use crate::domain::entities::offline::{MirrorRecord, QueueEntry, QueueStatusSnapshot};
use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload, QueueStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub fn queue_entry_from_row(row: QueueEntryRow) -> Result<QueueEntry, AppError> {
    let id = EntityId::new(row.id).map_err(AppError::DeserializationError)?;
    let kind = row
        .kind
        .parse::<DocumentKind>()
        .map_err(AppError::DeserializationError)?;
    let payload =
        MutationPayload::from_json_str(&row.payload).map_err(AppError::DeserializationError)?;
    let status = row
        .status
        .parse::<QueueStatus>()
        .map_err(AppError::DeserializationError)?;

    Ok(QueueEntry {
        id,
        kind,
        payload,
        status,
        updated_at: row.updated_at,
        attempt_count: u32::try_from(row.attempt_count).unwrap_or(u32::MAX),
        last_error: row.last_error,
        synced_at: row.synced_at.and_then(timestamp_to_datetime),
    })
}

pub fn mirror_record_from_row(row: MirrorRecordRow) -> Result<MirrorRecord, AppError> {
    let id = EntityId::new(row.id).map_err(AppError::DeserializationError)?;
    let fields: Map<String, Value> = serde_json::from_str(&row.fields)?;

    Ok(MirrorRecord {
        id,
        fields,
        is_from_server: row.is_from_server,
        updated_at: row.updated_at,
    })
}

pub fn queue_status_from_row(row: QueueCountsRow) -> QueueStatusSnapshot {
    QueueStatusSnapshot::new(
        row.pending.max(0) as u64,
        row.synced.max(0) as u64,
        row.oldest_pending_at,
    )
}

pub fn payload_to_json(payload: &MutationPayload) -> Result<String, AppError> {
    serde_json::to_string(payload.as_map())
        .map_err(|err| AppError::SerializationError(err.to_string()))
}

pub fn timestamp_to_datetime(ts_millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ts_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> QueueEntryRow {
        QueueEntryRow {
            id: "A1".into(),
            kind: "REPORT".into(),
            payload: r#"{"total":500000}"#.into(),
            status: "pending".into(),
            updated_at: 1_700_000_000_000,
            attempt_count: 2,
            last_error: Some("timeout".into()),
            synced_at: None,
        }
    }

    #[test]
    fn maps_queue_row() {
        let entry = queue_entry_from_row(row()).unwrap();
        assert_eq!(entry.id.as_str(), "A1");
        assert_eq!(entry.kind, DocumentKind::Report);
        assert_eq!(entry.status, QueueStatus::Pending);
        assert_eq!(entry.attempt_count, 2);
        assert_eq!(entry.payload.as_map()["total"], 500000);
    }

    #[test]
    fn unknown_kind_is_a_deserialization_error() {
        let mut bad = row();
        bad.kind = "INVOICE".into();
        assert!(matches!(
            queue_entry_from_row(bad),
            Err(AppError::DeserializationError(_))
        ));
    }
}
