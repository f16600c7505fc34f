use crate::domain::entities::offline::DrainReport;

/// Surfaces drain results to whoever renders notifications. Must not block.
pub trait SyncNotifier: Send + Sync {
    fn notify_completed(&self, report: &DrainReport) -> Result<(), String>;
    fn notify_failed(&self, report: &DrainReport) -> Result<(), String>;
}
