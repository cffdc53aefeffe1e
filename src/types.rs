//! Public and internal types for the boxfile API and pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Hex-encoded blake3 digest of a file's full content.
pub type Digest = String;

/// Record for one piece of content. Every path in `paths` holds byte-identical content.
///
/// `paths[0]` is the canonical path: the copy kept when duplicates are cleaned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Content length in bytes.
    pub size: u64,
    /// Best-effort content type; `"unknown"` when classification failed.
    pub content_type: String,
    /// Creation time of the first observed copy, nanoseconds since epoch.
    pub created_at_ns: i64,
    /// Modification time of the most recently merged path, nanoseconds since epoch.
    pub modified_at_ns: i64,
    /// Absolute paths, insertion ordered, no duplicates.
    pub paths: Vec<String>,
    /// Last observed mtime per path. Older documents may lack it; `modified_at_ns` is used then.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_mtimes_ns: BTreeMap<String, i64>,
}

impl IndexEntry {
    /// New entry holding a single path.
    pub fn new(meta: &FileMeta, path: String) -> Self {
        let mut path_mtimes_ns = BTreeMap::new();
        path_mtimes_ns.insert(path.clone(), meta.modified_at_ns);
        IndexEntry {
            size: meta.size,
            content_type: meta.content_type.clone(),
            created_at_ns: meta.created_at_ns,
            modified_at_ns: meta.modified_at_ns,
            paths: vec![path],
            path_mtimes_ns,
        }
    }

    pub fn canonical_path(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// More than one path shares this content.
    pub fn is_duplicated(&self) -> bool {
        self.paths.len() > 1
    }

    /// Record a fresh observation of `path`: bump `modified_at_ns` and append the path if new.
    pub fn observe(&mut self, path: String, modified_at_ns: i64) {
        self.modified_at_ns = modified_at_ns;
        self.path_mtimes_ns.insert(path.clone(), modified_at_ns);
        if !self.contains_path(&path) {
            self.paths.push(path);
        }
    }

    /// Recorded mtime for `path`, falling back to the entry-level mtime.
    pub fn path_mtime_ns(&self, path: &str) -> i64 {
        self.path_mtimes_ns
            .get(path)
            .copied()
            .unwrap_or(self.modified_at_ns)
    }

    /// Keep only paths for which `keep` returns true. Returns how many were dropped.
    pub fn retain_paths<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.paths.len();
        self.paths.retain(|p| keep(p));
        self.sync_path_mtimes();
        before - self.paths.len()
    }

    /// Replace the path list wholesale (order preserved).
    pub fn set_paths(&mut self, paths: Vec<String>) {
        self.paths = paths;
        self.sync_path_mtimes();
    }

    fn sync_path_mtimes(&mut self) {
        let paths = &self.paths;
        self.path_mtimes_ns.retain(|p, _| paths.contains(p));
    }
}

/// The whole content index: digest → entry. Ordered so the serialized document is deterministic.
pub type Index = BTreeMap<Digest, IndexEntry>;

/// Metadata captured for a file at indexing time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub content_type: String,
    pub created_at_ns: i64,
    pub modified_at_ns: i64,
}

/// Criteria a candidate file must meet to be indexed (or, for clean, to have its entry touched).
/// Symlinked files never pass.
#[derive(Clone, Debug, Default)]
pub struct IndexFilters {
    /// Lowercase extensions including the dot (e.g. `.jpg`). `None` = all.
    pub extensions: Option<Vec<String>>,
    pub min_size_bytes: u64,
    /// Earliest accepted creation time, nanoseconds since epoch.
    pub after_ns: Option<i64>,
}

impl IndexFilters {
    /// Build filters, normalizing extensions to lowercase with a leading dot.
    pub fn new(extensions: Option<Vec<String>>, min_size_bytes: u64, after_ns: Option<i64>) -> Self {
        let extensions = extensions.filter(|e| !e.is_empty()).map(|exts| {
            exts.into_iter()
                .map(|e| {
                    let e = e.to_lowercase();
                    if e.starts_with('.') { e } else { format!(".{e}") }
                })
                .collect()
        });
        IndexFilters {
            extensions,
            min_size_bytes,
            after_ns,
        }
    }

    /// True when no criterion is set (symlink exclusion still applies).
    pub fn is_unrestricted(&self) -> bool {
        self.extensions.is_none() && self.min_size_bytes == 0 && self.after_ns.is_none()
    }
}

/// Why a candidate ended up where it did during an index pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    /// Hashed and merged into the index.
    Indexed,
    /// Signature unchanged since last pass; not rehashed.
    Skipped,
    /// I/O error while hashing or probing.
    Failed,
    /// Rejected by filters (or a symlink).
    Ignored,
}

/// Counts returned by an index pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub indexed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub ignored: usize,
    /// Paths removed by the sweep because they were not seen on disk.
    pub pruned: usize,
}

impl IndexSummary {
    pub fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Indexed => self.indexed += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Failed => self.failed += 1,
            FileStatus::Ignored => self.ignored += 1,
        }
    }
}

/// Outcome of cleaning duplicates.
#[derive(Clone, Debug, Default)]
pub struct DedupeReport {
    /// Duplicates deleted or replaced with links.
    pub processed: usize,
    pub deleted: Vec<PathBuf>,
    pub linked: Vec<PathBuf>,
    /// Bytes freed by deletions (link mode frees space too but is not counted).
    pub bytes_reclaimed: u64,
    /// Duplicates that could not be removed; they stay in the index.
    pub failed: Vec<(PathBuf, String)>,
    /// Digests whose canonical path no longer exists; the entry was left alone.
    pub missing_masters: Vec<Digest>,
}

/// A file whose content no longer matches its recorded digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorruptFile {
    pub path: PathBuf,
    pub expected: Digest,
    pub actual: Digest,
}

impl CorruptFile {
    pub fn expected_prefix(&self) -> &str {
        digest_prefix(&self.expected)
    }

    pub fn actual_prefix(&self) -> &str {
        digest_prefix(&self.actual)
    }
}

/// Short form of a digest for reports.
pub fn digest_prefix(digest: &str) -> &str {
    digest.get(..8).unwrap_or(digest)
}

/// Integrity report, partitioned by classification.
#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub ok: usize,
    pub corrupt: Vec<CorruptFile>,
    pub missing: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

impl VerifyReport {
    pub fn total(&self) -> usize {
        self.ok + self.corrupt.len() + self.missing.len() + self.errors.len()
    }

    pub fn is_healthy(&self) -> bool {
        self.corrupt.is_empty() && self.missing.is_empty() && self.errors.is_empty()
    }
}

/// Consistency report.
#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub missing: Vec<PathBuf>,
    /// Entries deleted because no path survived (prune mode only).
    pub entries_removed: usize,
    pub pruned: bool,
}

/// Aggregate figures over an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub unique_contents: usize,
    pub total_files: usize,
    pub total_size: u64,
    pub duplicates: usize,
    pub reclaimable: u64,
}

/// Comparison of two independently maintained indexes.
#[derive(Clone, Debug, Default)]
pub struct IndexDiff {
    pub local_total: usize,
    pub remote_total: usize,
    pub common: Vec<Digest>,
    pub local_only: Vec<Digest>,
    pub remote_only: Vec<Digest>,
    /// Σ size over common digests.
    pub shared_bytes: u64,
    /// (canonical path, size) for the first few remote-only entries.
    pub remote_preview: Vec<(PathBuf, u64)>,
}

/// Full options for the indexing and verification operations.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub filters: IndexFilters,
    /// Override worker thread count. When None, derived from available parallelism and FD limit.
    pub num_threads: Option<usize>,
    /// Use parallel walk (jwalk) instead of walkdir.
    pub parallel_walk: bool,
    /// Directory names (glob syntax) pruned in addition to the defaults.
    pub ignore: Vec<String>,
    /// Show progress bars.
    pub verbose: bool,
}

/// The string form stored in the index. `None` for paths that are not valid UTF-8,
/// which cannot be recorded without losing the name.
pub fn path_to_index_string(path: &Path) -> Option<String> {
    path.to_str().map(str::to_owned)
}
