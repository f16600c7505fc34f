use crate::application::ports::sync_trigger::SyncTriggerHandler;
use crate::domain::entities::offline::SyncTrigger;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Turns startup and offline→online transitions into `SYNC_REQUESTED` events.
pub struct ConnectivityMonitor {
    state: Mutex<NetworkState>,
    handlers: RwLock<Vec<(SubscriptionId, Arc<dyn SyncTriggerHandler>)>>,
    next_id: AtomicU64,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NetworkState::Unknown),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn register(&self, handler: Arc<dyn SyncTriggerHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push((id, handler));
        }
        id
    }

    pub fn unregister(&self, id: SubscriptionId) -> bool {
        match self.handlers.write() {
            Ok(mut handlers) => {
                let before = handlers.len();
                handlers.retain(|(existing, _)| *existing != id);
                handlers.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn state(&self) -> NetworkState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(NetworkState::Unknown)
    }

    pub fn is_online(&self) -> bool {
        self.state() == NetworkState::Online
    }

    /// Records the state observed at startup; requests a sync if already online.
    pub fn app_started(&self, online: bool) -> Option<SyncTrigger> {
        self.swap_state(online);
        if online {
            self.emit(SyncTrigger::AppStart);
            Some(SyncTrigger::AppStart)
        } else {
            tracing::info!(target: "offline::connectivity", "started offline");
            None
        }
    }

    /// Records a connectivity observation. Only a transition into online requests a sync.
    pub fn set_online(&self, online: bool) -> Option<SyncTrigger> {
        let previous = self.swap_state(online);
        match (previous, online) {
            (NetworkState::Online, true) => None,
            (_, true) => {
                tracing::info!(
                    target: "offline::connectivity",
                    ?previous,
                    "connectivity restored"
                );
                self.emit(SyncTrigger::Reconnected);
                Some(SyncTrigger::Reconnected)
            }
            (NetworkState::Offline, false) => None,
            (_, false) => {
                tracing::info!(target: "offline::connectivity", "connectivity lost");
                None
            }
        }
    }

    fn swap_state(&self, online: bool) -> NetworkState {
        let next = if online {
            NetworkState::Online
        } else {
            NetworkState::Offline
        };
        match self.state.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    fn emit(&self, trigger: SyncTrigger) {
        // handlers run outside the lock so they may (un)register freely
        let handlers: Vec<Arc<dyn SyncTriggerHandler>> = match self.handlers.read() {
            Ok(guard) => guard.iter().map(|(_, handler)| Arc::clone(handler)).collect(),
            Err(_) => return,
        };
        tracing::debug!(
            target: "offline::connectivity",
            %trigger,
            handlers = handlers.len(),
            "sync requested"
        );
        for handler in handlers {
            handler.on_sync_requested(trigger);
        }
    }
}
