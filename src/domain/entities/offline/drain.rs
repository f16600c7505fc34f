use crate::domain::value_objects::offline::{DocumentKind, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a drain cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    AppStart,
    Reconnected,
    Manual,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::AppStart => "app_start",
            SyncTrigger::Reconnected => "reconnected",
            SyncTrigger::Manual => "manual",
        }
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Network unreachable, timeout, or a server-side fault; retrying may help.
    Transport,
    /// The remote refused the mutation; retrying the same payload will not help.
    Rejected,
    /// Delivery succeeded but the local acknowledgement could not be written.
    LocalAck,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntryFailure {
    pub id: EntityId,
    pub kind: DocumentKind,
    pub reason: FailureReason,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainStatus {
    Succeeded,
    Partial,
    Failed,
}

impl DrainStatus {
    pub fn from_counts(synced: usize, failed: usize) -> Self {
        match (synced, failed) {
            (_, 0) => DrainStatus::Succeeded,
            (0, _) => DrainStatus::Failed,
            _ => DrainStatus::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrainStatus::Succeeded => "succeeded",
            DrainStatus::Partial => "partial",
            DrainStatus::Failed => "failed",
        }
    }
}

/// Aggregate result of one drain cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub trigger: SyncTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempted: usize,
    pub synced: Vec<EntityId>,
    pub failures: Vec<EntryFailure>,
    pub status: DrainStatus,
}

impl DrainReport {
    pub fn new(
        trigger: SyncTrigger,
        started_at: DateTime<Utc>,
        synced: Vec<EntityId>,
        failures: Vec<EntryFailure>,
    ) -> Self {
        let status = DrainStatus::from_counts(synced.len(), failures.len());
        Self {
            trigger,
            started_at,
            finished_at: Utc::now(),
            attempted: synced.len() + failures.len(),
            synced,
            failures,
            status,
        }
    }

    pub fn failures_with(&self, reason: FailureReason) -> impl Iterator<Item = &EntryFailure> {
        self.failures.iter().filter(move |f| f.reason == reason)
    }

    /// One-line description suitable for a non-blocking notification.
    pub fn summary(&self) -> String {
        match self.status {
            DrainStatus::Succeeded => format!("{} change(s) synced", self.synced.len()),
            DrainStatus::Partial | DrainStatus::Failed => {
                let ids: Vec<&str> = self.failures.iter().map(|f| f.id.as_str()).collect();
                format!(
                    "{} of {} change(s) not synced: {}",
                    self.failures.len(),
                    self.attempted,
                    ids.join(", ")
                )
            }
        }
    }
}

/// Result of asking the orchestrator to drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Another cycle was already running; this request was folded into it.
    Coalesced,
    /// Nothing pending.
    Idle,
    Completed(DrainReport),
}

impl DrainOutcome {
    pub fn report(&self) -> Option<&DrainReport> {
        match self {
            DrainOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> EntityId {
        EntityId::new(value.into()).unwrap()
    }

    #[test]
    fn status_is_derived_from_counts() {
        assert_eq!(DrainStatus::from_counts(3, 0), DrainStatus::Succeeded);
        assert_eq!(DrainStatus::from_counts(2, 1), DrainStatus::Partial);
        assert_eq!(DrainStatus::from_counts(0, 2), DrainStatus::Failed);
    }

    #[test]
    fn summary_names_failed_entries() {
        let report = DrainReport::new(
            SyncTrigger::Reconnected,
            Utc::now(),
            vec![id("A1")],
            vec![EntryFailure {
                id: id("A2"),
                kind: DocumentKind::Receipt,
                reason: FailureReason::Rejected,
                message: "amount missing".into(),
            }],
        );
        assert_eq!(report.status, DrainStatus::Partial);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.summary(), "1 of 2 change(s) not synced: A2");
        assert_eq!(report.failures_with(FailureReason::Rejected).count(), 1);
        assert_eq!(report.failures_with(FailureReason::Transport).count(), 0);
    }
}
