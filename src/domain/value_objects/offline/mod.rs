pub mod document_kind;
pub mod entity_id;
pub mod payload;
pub mod queue_status;

pub use document_kind::{DeliveryMode, DocumentKind};
pub use entity_id::EntityId;
pub use payload::MutationPayload;
pub use queue_status::QueueStatus;
