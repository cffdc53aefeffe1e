//! Pipeline context: shared data passed into the walk thread and the hashing workers.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::engine::probe::MetadataProbe;
use crate::engine::reconcile::Reconciler;
use crate::utils::config::{PackagePaths, STREAMING_CHANNEL_CAP};
use crate::{FileStatus, Index, IndexFilters, Opts};

/// Walk errors: (path or synthetic marker, message).
pub type SkippedPaths = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// Shared context for the walk thread: root, pruned names, error sink.
pub struct PipelineContext {
    pub root: PathBuf,
    pub ignored: Vec<String>,
    pub skipped_paths: SkippedPaths,
}

/// What every hashing worker reads (reconciler, probe, filters) and the one thing it writes
/// (the index, behind its mutex).
pub struct WorkerShared {
    pub index: Arc<Mutex<Index>>,
    pub reconciler: Arc<Reconciler>,
    pub probe: Arc<dyn MetadataProbe>,
    pub filters: IndexFilters,
}

/// Result of processing one candidate. `path` is the absolute index string
/// (lossy, for display only, when the candidate was ignored for a non-UTF-8 name).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive outcomes, then join.
/// `path_count_rx` receives the number of candidates once the walk finishes.
pub struct PipelineHandles {
    pub outcome_rx: Receiver<FileOutcome>,
    pub path_count_rx: Receiver<usize>,
    pub walk_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub skipped_paths: SkippedPaths,
}

/// Channels and shared state for the pipeline. Walk thread gets path_tx, path_count_tx, ctx;
/// workers get path_rx, outcome_tx.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub outcome_tx: Sender<FileOutcome>,
    pub outcome_rx: Receiver<FileOutcome>,
    pub path_count_tx: Sender<usize>,
    pub path_count_rx: Receiver<usize>,
    pub skipped_paths: SkippedPaths,
    pub ctx: PipelineContext,
}

pub fn create_pipeline_channels(root: &Path, opts: &Opts) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(STREAMING_CHANNEL_CAP);
    let (outcome_tx, outcome_rx) = bounded::<FileOutcome>(STREAMING_CHANNEL_CAP);
    let (path_count_tx, path_count_rx) = bounded::<usize>(1);
    let skipped_paths: SkippedPaths = Arc::new(Mutex::new(Vec::new()));

    let mut ignored = PackagePaths::get().default_ignored_dirs();
    ignored.extend(opts.ignore.iter().cloned());

    let ctx = PipelineContext {
        root: root.to_path_buf(),
        ignored,
        skipped_paths: Arc::clone(&skipped_paths),
    };

    PipelineChannels {
        path_tx,
        path_rx,
        outcome_tx,
        outcome_rx,
        path_count_tx,
        path_count_rx,
        skipped_paths,
        ctx,
    }
}
