pub mod mirror_store;
pub mod mutation_gateway;
pub mod queue_store;
pub mod sync_notifier;
pub mod sync_trigger;

pub use mirror_store::MirrorStore;
pub use mutation_gateway::{CreatedDocument, GatewayAck, GatewayError, MutationGateway};
pub use queue_store::MutationQueueStore;
pub use sync_notifier::SyncNotifier;
pub use sync_trigger::SyncTriggerHandler;
