use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::filters::should_index;
use crate::engine::hashing::hash_file;
use crate::engine::reconcile::Reconciliation;
use crate::index::merge_hashed_file;
use crate::{FileStatus, path_to_index_string};

use super::context::{FileOutcome, WorkerShared};

/// Single hashing worker: read paths from path_rx, process each, send the outcome on outcome_tx.
fn hash_worker_loop(
    path_rx: Receiver<PathBuf>,
    outcome_tx: Sender<FileOutcome>,
    shared: Arc<WorkerShared>,
) {
    while let Ok(abs_path) = path_rx.recv() {
        let outcome = process_candidate(&abs_path, &shared);
        if outcome_tx.send(outcome).is_err() {
            break;
        }
    }
    drop(outcome_tx);
}

/// Spawn hashing workers. Caller must drop its own outcome sender afterwards so the channel closes.
pub fn spawn_hash_workers(
    path_rx: Receiver<PathBuf>,
    outcome_tx: &Sender<FileOutcome>,
    shared: &Arc<WorkerShared>,
    num_threads: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_threads)
        .map(|_| {
            let path_rx = path_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let shared = Arc::clone(shared);
            thread::spawn(move || hash_worker_loop(path_rx, outcome_tx, shared))
        })
        .collect()
}

/// Filter, reconcile, hash, probe and merge one candidate.
/// Everything except the merge runs without holding the index lock.
pub fn process_candidate(abs_path: &Path, shared: &WorkerShared) -> FileOutcome {
    let Some(path) = path_to_index_string(abs_path) else {
        warn!("Skipping non-UTF-8 path: {}", abs_path.display());
        return FileOutcome {
            path: abs_path.to_string_lossy().into_owned(),
            status: FileStatus::Ignored,
        };
    };
    let status = classify_and_merge(abs_path, &path, shared);
    FileOutcome { path, status }
}

fn classify_and_merge(abs_path: &Path, path: &str, shared: &WorkerShared) -> FileStatus {
    if !should_index(abs_path, &shared.filters) {
        return FileStatus::Ignored;
    }

    let live = match std::fs::metadata(abs_path) {
        Ok(m) => m,
        Err(e) => {
            debug!("stat failed for {}: {}", abs_path.display(), e);
            return FileStatus::Failed;
        }
    };
    if shared.reconciler.classify(path, &live) == Reconciliation::Unchanged {
        return FileStatus::Skipped;
    }

    let digest = match hash_file(abs_path) {
        Ok(d) => d,
        Err(e) => {
            debug!("hash failed for {}: {:#}", abs_path.display(), e);
            return FileStatus::Failed;
        }
    };
    let meta = match shared.probe.probe(abs_path) {
        Ok(m) => m,
        Err(e) => {
            debug!("probe failed for {}: {}", abs_path.display(), e);
            return FileStatus::Failed;
        }
    };

    let previous = shared.reconciler.previous_digest(path);
    let mut index = shared.index.lock().unwrap_or_else(|e| e.into_inner());
    merge_hashed_file(&mut index, digest, &meta, path.to_string(), previous);
    FileStatus::Indexed
}
