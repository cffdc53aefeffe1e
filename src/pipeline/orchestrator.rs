use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::Opts;
use crate::engine::parallel::{parallel_walk_handler, worker_count};
use crate::pipeline;

use super::context::WorkerShared;

/// Start the walk + hashing pipeline over an already canonical `root`. Caller receives from
/// `outcome_rx` and must join `walk_handle` and `worker_handles` when done.
pub fn run_pipeline(
    root: &Path,
    opts: &Opts,
    shared: &Arc<WorkerShared>,
) -> Result<pipeline::PipelineHandles> {
    let num_threads = worker_count(opts.num_threads);
    parallel_walk_handler(opts.parallel_walk);

    let channels = pipeline::create_pipeline_channels(root, opts);

    let walk_handle = pipeline::spawn_walk_thread(
        channels.path_tx,
        channels.path_count_tx,
        channels.ctx,
        opts.parallel_walk,
    );

    let worker_handles = pipeline::spawn_hash_workers(
        channels.path_rx,
        &channels.outcome_tx,
        shared,
        num_threads,
    );

    // Dropping the last sender closes the channel so the receiver loop ends.
    drop(channels.outcome_tx);

    Ok(pipeline::PipelineHandles {
        outcome_rx: channels.outcome_rx,
        path_count_rx: channels.path_count_rx,
        walk_handle,
        worker_handles,
        skipped_paths: channels.skipped_paths,
    })
}

/// Join walk and worker threads (after the outcome stream is drained). Returns the candidate count.
pub fn shutdown_pipeline_handles(
    walk_handle: std::thread::JoinHandle<usize>,
    worker_handles: Vec<std::thread::JoinHandle<()>>,
) -> Result<usize> {
    let path_count = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    for h in worker_handles {
        h.join()
            .map_err(|_| anyhow::anyhow!("hash worker panicked"))?;
    }
    Ok(path_count)
}
