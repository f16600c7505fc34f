use crate::domain::value_objects::offline::{DocumentKind, EntityId, MutationPayload, QueueStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending (or already delivered) write for one entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: EntityId,
    pub kind: DocumentKind,
    pub payload: MutationPayload,
    pub status: QueueStatus,
    /// Strictly increasing across the queue; also identifies this revision of the entry.
    pub updated_at: i64,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    pub fn is_pending(&self) -> bool {
        self.status == QueueStatus::Pending
    }

    pub fn revision(&self) -> i64 {
        self.updated_at
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.updated_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusSnapshot {
    pub pending: u64,
    pub synced: u64,
    pub oldest_pending_at: Option<i64>,
}

impl QueueStatusSnapshot {
    pub fn new(pending: u64, synced: u64, oldest_pending_at: Option<i64>) -> Self {
        Self {
            pending,
            synced,
            oldest_pending_at,
        }
    }
}
