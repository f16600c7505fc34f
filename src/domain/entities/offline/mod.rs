pub mod drain;
pub mod mirror_record;
pub mod queue_entry;

pub use drain::{
    DrainOutcome, DrainReport, DrainStatus, EntryFailure, FailureReason, SyncTrigger,
};
pub use mirror_record::{MirrorRecord, MirrorRecordDraft, MirrorReplaceReport};
pub use queue_entry::{QueueEntry, QueueStatusSnapshot};
