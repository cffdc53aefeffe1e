//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    store_dir_name: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Index document file name inside the store dir.
    pub const INDEX_FILENAME: &'static str = "index.json";
    /// Config document file name inside the store dir.
    pub const CONFIG_FILENAME: &'static str = "config.toml";

    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                store_dir_name: format!(".{pkg}"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Hidden directory at the repository root (e.g. `.boxfile`).
    pub fn store_dir_name(&self) -> &str {
        &self.store_dir_name
    }

    pub fn store_dir(&self, root: &Path) -> PathBuf {
        root.join(self.store_dir_name())
    }

    pub fn index_path(&self, root: &Path) -> PathBuf {
        self.store_dir(root).join(Self::INDEX_FILENAME)
    }

    pub fn config_path(&self, root: &Path) -> PathBuf {
        self.store_dir(root).join(Self::CONFIG_FILENAME)
    }

    /// Directory names pruned from every walk, wherever they appear.
    pub fn default_ignored_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect();
        dirs.push(self.store_dir_name().to_string());
        dirs
    }
}

/// Version control, package caches and OS trash.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "$RECYCLE.BIN",
    "__pycache__",
    ".venv",
    "venv",
];

// ---- Worker threads ----

/// Worker pool bounds. Work is I/O bound, so the pool runs a few threads above the CPU count.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Threads added on top of `all_threads`.
    pub io_extra: usize,
    /// Hard ceiling.
    pub max: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 1,
            io_extra: Self::IO_EXTRA_THREADS,
            max: Self::MAX_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const IO_EXTRA_THREADS: usize = 4;
    pub const MAX_THREADS: usize = 32;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// `min(max, all_threads + io_extra)`, never below 1.
    pub fn pool_size(&self) -> usize {
        (self.all_threads + self.io_extra).min(self.max).max(1)
    }
}

// ---- Hashing ----

/// Hashing buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Chunk size for streaming file content into the hasher (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Indexing ----

/// Two mtimes closer than this are the same observation (1 ms).
pub const MTIME_EPSILON_NS: i64 = 1_000_000;

/// Capacity for the path and outcome channels of the index pipeline.
pub const STREAMING_CHANNEL_CAP: usize = 50_000;

// ---- Reports ----

/// Number of remote-only entries listed by diff.
pub const DIFF_PREVIEW_LIMIT: usize = 5;
