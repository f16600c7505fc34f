pub mod offline;

pub use offline::{
    DrainOutcome, DrainReport, DrainStatus, EntryFailure, FailureReason, MirrorRecord,
    MirrorRecordDraft, MirrorReplaceReport, QueueEntry, QueueStatusSnapshot, SyncTrigger,
};
