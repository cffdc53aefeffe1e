//! Pipeline components: context, walk loop, hashing workers, error handling.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use context::{
    FileOutcome, PipelineChannels, PipelineContext, PipelineHandles, SkippedPaths, WorkerShared,
    create_pipeline_channels,
};
pub use error_handler::report_skipped_paths;
pub use orchestrator::{run_pipeline, shutdown_pipeline_handles};
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_jwalk, to_outcome_walkdir};
pub use worker::{process_candidate, spawn_hash_workers};
