use crate::domain::entities::offline::SyncTrigger;

/// Receives `SYNC_REQUESTED` events. May be invoked more than once per transition.
pub trait SyncTriggerHandler: Send + Sync {
    fn on_sync_requested(&self, trigger: SyncTrigger);
}

impl<F> SyncTriggerHandler for F
where
    F: Fn(SyncTrigger) + Send + Sync,
{
    fn on_sync_requested(&self, trigger: SyncTrigger) {
        self(trigger)
    }
}
