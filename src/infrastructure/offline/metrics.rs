use crate::domain::entities::offline::{DrainReport, DrainStatus, SyncTrigger};
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub total_cycles: u64,
    pub total_succeeded: u64,
    pub total_partial: u64,
    pub total_failed: u64,
    pub total_coalesced: u64,
    pub entries_synced: u64,
    pub entries_failed: u64,
    pub consecutive_unsuccessful: u64,
    pub last_status: Option<DrainStatus>,
    pub last_trigger: Option<SyncTrigger>,
    pub last_duration_ms: Option<u64>,
    pub last_finished_ms: Option<i64>,
}

#[derive(Default, Clone)]
struct LastCycle {
    status: Option<DrainStatus>,
    trigger: Option<SyncTrigger>,
    duration_ms: Option<u64>,
    finished_ms: Option<i64>,
}

/// Counters for drain cycles run by one orchestrator.
#[derive(Default)]
pub struct SyncMetrics {
    cycles: AtomicU64,
    succeeded: AtomicU64,
    partial: AtomicU64,
    failed: AtomicU64,
    coalesced: AtomicU64,
    entries_synced: AtomicU64,
    entries_failed: AtomicU64,
    consecutive_unsuccessful: AtomicU64,
    last: Mutex<LastCycle>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&self, report: &DrainReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        match report.status {
            DrainStatus::Succeeded => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                self.consecutive_unsuccessful.store(0, Ordering::Relaxed);
            }
            DrainStatus::Partial => {
                self.partial.fetch_add(1, Ordering::Relaxed);
                self.consecutive_unsuccessful.fetch_add(1, Ordering::Relaxed);
            }
            DrainStatus::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.consecutive_unsuccessful.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.entries_synced
            .fetch_add(report.synced.len() as u64, Ordering::Relaxed);
        self.entries_failed
            .fetch_add(report.failures.len() as u64, Ordering::Relaxed);

        let duration_ms = (report.finished_at - report.started_at)
            .num_milliseconds()
            .max(0) as u64;
        if let Ok(mut guard) = self.last.lock() {
            guard.status = Some(report.status);
            guard.trigger = Some(report.trigger);
            guard.duration_ms = Some(duration_ms);
            guard.finished_ms = Some(report.finished_at.timestamp_millis());
        }
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        let last = self
            .last
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        SyncMetricsSnapshot {
            total_cycles: self.cycles.load(Ordering::Relaxed),
            total_succeeded: self.succeeded.load(Ordering::Relaxed),
            total_partial: self.partial.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
            total_coalesced: self.coalesced.load(Ordering::Relaxed),
            entries_synced: self.entries_synced.load(Ordering::Relaxed),
            entries_failed: self.entries_failed.load(Ordering::Relaxed),
            consecutive_unsuccessful: self.consecutive_unsuccessful.load(Ordering::Relaxed),
            last_status: last.status,
            last_trigger: last.trigger,
            last_duration_ms: last.duration_ms,
            last_finished_ms: last.finished_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::{EntryFailure, FailureReason};
    use crate::domain::value_objects::offline::{DocumentKind, EntityId};
    use chrono::Utc;

    fn id(value: &str) -> EntityId {
        EntityId::new(value.into()).unwrap()
    }

    #[test]
    fn record_success_and_failure() {
        let metrics = SyncMetrics::new();

        let ok = DrainReport::new(SyncTrigger::AppStart, Utc::now(), vec![id("A"), id("B")], vec![]);
        metrics.record_cycle(&ok);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_cycles, 1);
        assert_eq!(snapshot.total_succeeded, 1);
        assert_eq!(snapshot.entries_synced, 2);
        assert_eq!(snapshot.last_status, Some(DrainStatus::Succeeded));
        assert_eq!(snapshot.last_trigger, Some(SyncTrigger::AppStart));

        let failed = DrainReport::new(
            SyncTrigger::Reconnected,
            Utc::now(),
            vec![],
            vec![EntryFailure {
                id: id("C"),
                kind: DocumentKind::Report,
                reason: FailureReason::Transport,
                message: "timeout".into(),
            }],
        );
        metrics.record_cycle(&failed);
        metrics.record_coalesced();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_cycles, 2);
        assert_eq!(snapshot.total_failed, 1);
        assert_eq!(snapshot.total_coalesced, 1);
        assert_eq!(snapshot.entries_failed, 1);
        assert_eq!(snapshot.consecutive_unsuccessful, 1);
        assert_eq!(snapshot.last_status, Some(DrainStatus::Failed));
    }
}
