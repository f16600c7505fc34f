pub mod offline;

pub use offline::{DeliveryMode, DocumentKind, EntityId, MutationPayload, QueueStatus};
