use crate::application::ports::sync_notifier::SyncNotifier;
use crate::domain::entities::offline::DrainReport;
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Warning,
}

/// Non-blocking toast-style message for the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncNotification {
    pub level: NotificationLevel,
    pub summary: String,
    pub report: DrainReport,
}

/// Fans drain results out to any number of UI subscribers.
#[derive(Clone)]
pub struct ChannelSyncNotifier {
    sender: broadcast::Sender<SyncNotification>,
    announce_success: bool,
}

impl ChannelSyncNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            announce_success: true,
        }
    }

    /// Successful drains stay silent; only partial or failed ones are published.
    pub fn failures_only(mut self) -> Self {
        self.announce_success = false;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotification> {
        self.sender.subscribe()
    }

    fn publish(&self, level: NotificationLevel, report: &DrainReport) -> Result<(), String> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(SyncNotification {
                level,
                summary: report.summary(),
                report: report.clone(),
            })
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

impl SyncNotifier for ChannelSyncNotifier {
    fn notify_completed(&self, report: &DrainReport) -> Result<(), String> {
        if !self.announce_success {
            return Ok(());
        }
        self.publish(NotificationLevel::Info, report)
    }

    fn notify_failed(&self, report: &DrainReport) -> Result<(), String> {
        self.publish(NotificationLevel::Warning, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::{EntryFailure, FailureReason, SyncTrigger};
    use crate::domain::value_objects::offline::{DocumentKind, EntityId};
    use chrono::Utc;

    fn failed_report() -> DrainReport {
        DrainReport::new(
            SyncTrigger::Reconnected,
            Utc::now(),
            vec![],
            vec![EntryFailure {
                id: EntityId::new("A2".into()).unwrap(),
                kind: DocumentKind::Report,
                reason: FailureReason::Transport,
                message: "timeout".into(),
            }],
        )
    }

    #[tokio::test]
    async fn failed_drain_is_published_as_warning() {
        let notifier = ChannelSyncNotifier::new(4).failures_only();
        let mut rx = notifier.subscribe();

        let ok = DrainReport::new(SyncTrigger::AppStart, Utc::now(), vec![], vec![]);
        notifier.notify_completed(&ok).unwrap();
        notifier.notify_failed(&failed_report()).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Warning);
        assert!(received.summary.contains("A2"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let notifier = ChannelSyncNotifier::new(1);
        assert!(notifier.notify_failed(&failed_report()).is_ok());
    }
}
