mod mappers;
pub mod metrics;
mod rows;
pub mod sqlite_mirror_store;
pub mod sqlite_queue_store;

pub use metrics::{SyncMetrics, SyncMetricsSnapshot};
pub use sqlite_mirror_store::SqliteMirrorStore;
pub use sqlite_queue_store::SqliteMutationQueueStore;
