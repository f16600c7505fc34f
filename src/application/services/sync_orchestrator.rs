use crate::application::ports::mutation_gateway::{GatewayError, MutationGateway};
use crate::application::ports::queue_store::MutationQueueStore;
use crate::application::ports::sync_notifier::SyncNotifier;
use crate::application::ports::sync_trigger::SyncTriggerHandler;
use crate::domain::entities::offline::{
    DrainOutcome, DrainReport, DrainStatus, EntryFailure, FailureReason, QueueEntry, SyncTrigger,
};
use crate::domain::value_objects::offline::{DeliveryMode, EntityId};
use crate::infrastructure::offline::SyncMetrics;
use crate::shared::error::AppError;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Drains the mutation queue against the remote gateway.
///
/// At most one drain runs at a time per orchestrator. Entries are delivered
/// concurrently and independently: one entry's failure never blocks or rolls
/// back another's acknowledgement. An entry is only marked synced when the
/// revision that was delivered is still the one on disk.
pub struct SyncOrchestrator {
    queue: Arc<dyn MutationQueueStore>,
    gateway: Arc<dyn MutationGateway>,
    notifier: Option<Arc<dyn SyncNotifier>>,
    metrics: Arc<SyncMetrics>,
    in_flight: AtomicBool,
}

struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncOrchestrator {
    pub fn new(queue: Arc<dyn MutationQueueStore>, gateway: Arc<dyn MutationGateway>) -> Self {
        Self {
            queue,
            gateway,
            notifier: None,
            metrics: Arc::new(SyncMetrics::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn SyncNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<SyncMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Handler for connectivity events. Each event spawns a drain and returns immediately.
    pub fn trigger_handler(self: &Arc<Self>) -> Arc<dyn SyncTriggerHandler> {
        Arc::new(SpawnDrainHandler {
            orchestrator: Arc::clone(self),
        })
    }

    /// Runs one drain cycle, or returns `Coalesced` if one is already running.
    ///
    /// Only a failure to read the pending list is returned as `Err`; per-entry
    /// failures are reported inside the `DrainReport`.
    pub async fn request_sync(&self, trigger: SyncTrigger) -> Result<DrainOutcome, AppError> {
        let Some(_guard) = DrainGuard::acquire(&self.in_flight) else {
            self.metrics.record_coalesced();
            tracing::debug!(target: "offline::sync", %trigger, "drain already running");
            return Ok(DrainOutcome::Coalesced);
        };

        let started_at = Utc::now();
        let pending = self.queue.list_pending().await?;
        if pending.is_empty() {
            tracing::debug!(target: "offline::sync", %trigger, "nothing to drain");
            return Ok(DrainOutcome::Idle);
        }

        tracing::info!(
            target: "offline::sync",
            %trigger,
            pending = pending.len(),
            "drain started"
        );

        let results = join_all(pending.into_iter().map(|entry| self.deliver(entry))).await;

        let mut synced = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(id) => synced.push(id),
                Err(failure) => failures.push(failure),
            }
        }

        let report = DrainReport::new(trigger, started_at, synced, failures);
        self.metrics.record_cycle(&report);
        tracing::info!(
            target: "offline::sync",
            %trigger,
            status = report.status.as_str(),
            synced = report.synced.len(),
            failed = report.failures.len(),
            duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "drain finished"
        );
        self.notify(&report);

        Ok(DrainOutcome::Completed(report))
    }

    async fn deliver(&self, entry: QueueEntry) -> Result<EntityId, EntryFailure> {
        let revision = entry.revision();
        let delivery = match entry.kind.delivery() {
            DeliveryMode::Create => self
                .gateway
                .create(&entry.id, &entry.payload)
                .await
                .map(|created| {
                    if created.id != entry.id {
                        tracing::debug!(
                            target: "offline::sync",
                            id = %entry.id,
                            remote_id = %created.id,
                            "remote assigned a different id"
                        );
                    }
                }),
            DeliveryMode::Upsert => self
                .gateway
                .upsert(entry.kind, &entry.id, &entry.payload)
                .await
                .map(|_| ()),
        };

        let (reason, message) = match delivery {
            Ok(()) => return self.acknowledge(entry, revision).await,
            Err(GatewayError::Transport(message)) => (FailureReason::Transport, message),
            Err(GatewayError::Rejected { message, .. }) => (FailureReason::Rejected, message),
        };

        tracing::warn!(
            target: "offline::sync",
            id = %entry.id,
            kind = %entry.kind,
            ?reason,
            error = %message,
            "delivery failed; entry stays pending"
        );
        if let Err(err) = self.queue.record_failure(&entry.id, revision, &message).await {
            tracing::warn!(
                target: "offline::sync",
                id = %entry.id,
                error = %err,
                "failed to record delivery failure"
            );
        }

        Err(EntryFailure {
            id: entry.id,
            kind: entry.kind,
            reason,
            message,
        })
    }

    async fn acknowledge(&self, entry: QueueEntry, revision: i64) -> Result<EntityId, EntryFailure> {
        match self.queue.acknowledge(&entry.id, revision).await {
            Ok(flipped) => {
                if !flipped {
                    tracing::debug!(
                        target: "offline::sync",
                        id = %entry.id,
                        revision,
                        "entry changed during delivery; newer revision left pending"
                    );
                }
                Ok(entry.id)
            }
            Err(err) => {
                tracing::warn!(
                    target: "offline::sync",
                    id = %entry.id,
                    error = %err,
                    "delivered but could not mark synced"
                );
                Err(EntryFailure {
                    id: entry.id,
                    kind: entry.kind,
                    reason: FailureReason::LocalAck,
                    message: err.to_string(),
                })
            }
        }
    }

    fn notify(&self, report: &DrainReport) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let result = match report.status {
            DrainStatus::Succeeded => notifier.notify_completed(report),
            DrainStatus::Partial | DrainStatus::Failed => notifier.notify_failed(report),
        };
        if let Err(err) = result {
            tracing::warn!(target: "offline::sync", error = %err, "failed to deliver sync notification");
        }
    }
}

struct SpawnDrainHandler {
    orchestrator: Arc<SyncOrchestrator>,
}

impl SyncTriggerHandler for SpawnDrainHandler {
    fn on_sync_requested(&self, trigger: SyncTrigger) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(target: "offline::sync", %trigger, "no runtime available; sync request dropped");
            return;
        };
        let orchestrator = Arc::clone(&self.orchestrator);
        runtime.spawn(async move {
            if let Err(err) = orchestrator.request_sync(trigger).await {
                tracing::error!(target: "offline::sync", %trigger, error = %err, "drain aborted");
            }
        });
    }
}
