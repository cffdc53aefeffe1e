//! Directory indexing: walk, reconcile, hash, merge, sweep, persist.

use anyhow::Result;
use log::debug;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::engine::probe::{MetadataProbe, MimeProbe};
use crate::engine::progress::{ProgressBar, finish_bar, optional_bar, set_bar_total, update_progress_bar};
use crate::engine::reconcile::Reconciler;
use crate::engine::store::{load_index, save_index};
use crate::engine::tools::check_root_and_canonicalize;
use crate::pipeline::{
    PipelineHandles, WorkerShared, report_skipped_paths, run_pipeline, shutdown_pipeline_handles,
};
use crate::{Digest, FileMeta, FileStatus, Index, IndexEntry, IndexSummary, Opts};

/// Runs one index pass over a tree. Owns the index and the mutex that serializes merges,
/// so independent instances never share state.
pub struct ConcurrentIndexer {
    index: Arc<Mutex<Index>>,
    reconciler: Arc<Reconciler>,
    probe: Arc<dyn MetadataProbe>,
    opts: Opts,
}

impl ConcurrentIndexer {
    /// Build an indexer over `index` (usually freshly loaded). Reconciliation data is taken from it now.
    pub fn new(index: Index, opts: Opts) -> Self {
        let reconciler = Arc::new(Reconciler::from_index(&index));
        ConcurrentIndexer {
            index: Arc::new(Mutex::new(index)),
            reconciler,
            probe: Arc::new(MimeProbe),
            opts,
        }
    }

    /// Replace the default metadata probe.
    pub fn with_probe(mut self, probe: Arc<dyn MetadataProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Index every candidate under `root`, then sweep paths not seen on disk.
    /// Returns the updated index and the pass counts. Nothing is persisted here.
    pub fn run(self, root: &Path) -> Result<(Index, IndexSummary)> {
        let root = check_root_and_canonicalize(root)?;
        debug!(
            "Indexing {} ({} known paths)",
            root.display(),
            self.reconciler.len()
        );

        let shared = Arc::new(WorkerShared {
            index: Arc::clone(&self.index),
            reconciler: Arc::clone(&self.reconciler),
            probe: Arc::clone(&self.probe),
            filters: self.opts.filters.clone(),
        });

        let PipelineHandles {
            outcome_rx,
            path_count_rx,
            walk_handle,
            worker_handles,
            skipped_paths,
        } = run_pipeline(&root, &self.opts, &shared)?;

        let bar = optional_bar(self.opts.verbose, 0, "Processing");
        spawn_total_setter(&bar, path_count_rx);

        let mut summary = IndexSummary::default();
        let mut seen_on_disk: HashSet<String> = HashSet::new();
        let mut received = 0_usize;
        while let Ok(outcome) = outcome_rx.recv() {
            if matches!(outcome.status, FileStatus::Indexed | FileStatus::Skipped) {
                seen_on_disk.insert(outcome.path);
            }
            summary.record(outcome.status);
            received += 1;
            if let Some(bar) = &bar {
                update_progress_bar(bar, 1);
            }
        }
        let path_count = shutdown_pipeline_handles(walk_handle, worker_handles)?;
        finish_bar(&bar, received);
        report_skipped_paths(&skipped_paths, self.opts.verbose);
        debug!("{} candidates, {} outcomes", path_count, received);

        // Workers are joined; `shared` still holds a clone of the Arc, so take the map out under the lock.
        drop(shared);
        let mut index = std::mem::take(&mut *self.index.lock().unwrap_or_else(|e| e.into_inner()));
        summary.pruned = sweep_unseen(&mut index, &seen_on_disk);
        Ok((index, summary))
    }
}

/// Total arrives when the walk finishes; the coordinating thread is busy draining outcomes then.
fn spawn_total_setter(bar: &Option<ProgressBar>, path_count_rx: crossbeam_channel::Receiver<usize>) {
    if let Some(bar) = bar {
        let bar = Arc::clone(bar);
        thread::spawn(move || {
            if let Ok(total) = path_count_rx.recv() {
                set_bar_total(&bar, total);
            }
        });
    }
}

/// Merge a freshly hashed file. New digest → new entry; known digest → bump mtime, append path if absent.
/// If the path was last recorded under a different digest it is detached from that entry
/// (and the entry dropped when it empties).
pub fn merge_hashed_file(
    index: &mut Index,
    digest: Digest,
    meta: &FileMeta,
    path: String,
    previous_digest: Option<&str>,
) {
    if let Some(prev) = previous_digest
        && prev != digest
        && let Some(old) = index.get_mut(prev)
    {
        old.retain_paths(|p| p != path);
        if old.paths.is_empty() {
            index.remove(prev);
        }
    }

    match index.get_mut(&digest) {
        Some(entry) => entry.observe(path, meta.modified_at_ns),
        None => {
            index.insert(digest, IndexEntry::new(meta, path));
        }
    }
}

/// Drop every recorded path not in `seen`; delete entries left empty. Returns paths removed.
pub fn sweep_unseen(index: &mut Index, seen: &HashSet<String>) -> usize {
    let mut pruned = 0;
    let mut emptied: Vec<Digest> = Vec::new();
    for (digest, entry) in index.iter_mut() {
        pruned += entry.retain_paths(|p| seen.contains(p));
        if entry.paths.is_empty() {
            emptied.push(digest.clone());
        }
    }
    for digest in emptied {
        index.remove(&digest);
    }
    pruned
}

/// Index `root` into the document at `index_path`: load, run a pass, save atomically.
pub fn index_dir(root: &Path, index_path: &Path, opts: &Opts) -> Result<IndexSummary> {
    let index = load_index(index_path);
    let (index, summary) = ConcurrentIndexer::new(index, opts.clone()).run(root)?;
    save_index(&index, index_path)?;
    debug!(
        "Indexed {} | cached {} | failed {} | ignored {} | pruned {}",
        summary.indexed, summary.skipped, summary.failed, summary.ignored, summary.pruned
    );
    Ok(summary)
}
