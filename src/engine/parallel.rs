//! Shared helpers for parallel processing.

use log::debug;

use crate::utils::config::WorkerThreadLimits;
use crate::utils::fd_limit::cap_workers;

/// Worker pool size: the override if given, else `min(32, cpus + 4)`; then capped by the FD limit.
pub fn worker_count(override_threads: Option<usize>) -> usize {
    let requested = match override_threads {
        Some(n) => n.max(1),
        None => WorkerThreadLimits::current().pool_size(),
    };
    let n = cap_workers(requested);
    debug!("Worker pool size: {}", n);
    n
}

pub fn parallel_walk_handler(parallel_walk: bool) {
    if parallel_walk {
        debug!("Walking in parallel");
    } else {
        debug!("Walking serially");
    }
}
