pub mod mirror_service;
pub mod mutation_queue_service;
pub mod sync_orchestrator;

pub use mirror_service::MirrorService;
pub use mutation_queue_service::MutationQueueService;
pub use sync_orchestrator::SyncOrchestrator;
