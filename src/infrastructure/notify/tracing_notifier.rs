use crate::application::ports::sync_notifier::SyncNotifier;
use crate::domain::entities::offline::{DrainReport, FailureReason};

/// Writes drain outcomes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSyncNotifier;

impl SyncNotifier for TracingSyncNotifier {
    fn notify_completed(&self, report: &DrainReport) -> Result<(), String> {
        tracing::info!(
            target: "offline::sync",
            trigger = %report.trigger,
            synced = report.synced.len(),
            "{}",
            report.summary()
        );
        Ok(())
    }

    fn notify_failed(&self, report: &DrainReport) -> Result<(), String> {
        tracing::warn!(
            target: "offline::sync",
            trigger = %report.trigger,
            status = report.status.as_str(),
            synced = report.synced.len(),
            transport_failures = report.failures_with(FailureReason::Transport).count(),
            rejections = report.failures_with(FailureReason::Rejected).count(),
            "{}",
            report.summary()
        );
        for failure in &report.failures {
            tracing::debug!(
                target: "offline::sync",
                id = %failure.id,
                kind = %failure.kind,
                reason = ?failure.reason,
                message = %failure.message,
                "entry left pending"
            );
        }
        Ok(())
    }
}
