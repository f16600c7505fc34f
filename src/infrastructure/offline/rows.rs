use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct QueueEntryRow {
    pub id: String,
    pub kind: String,
    pub payload: String,
    pub status: String,
    pub updated_at: i64,
    pub attempt_count: i64,
    pub last_error: Option<String>,
    pub synced_at: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MirrorRecordRow {
    pub id: String,
    pub fields: String,
    pub is_from_server: bool,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct QueueCountsRow {
    pub pending: i64,
    pub synced: i64,
    pub oldest_pending_at: Option<i64>,
}
