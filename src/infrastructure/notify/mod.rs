pub mod channel_notifier;
pub mod tracing_notifier;

pub use channel_notifier::{ChannelSyncNotifier, NotificationLevel, SyncNotification};
pub use tracing_notifier::TracingSyncNotifier;
