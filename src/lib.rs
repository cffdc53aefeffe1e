//! Boxfile: content-addressed file index with incremental re-scans, safe deduplication
//! and integrity checks.

pub mod check;
pub mod dedupe;
pub mod engine;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod repo;
pub mod types;
pub mod utils;
pub mod verify;

/// Re-export types for API
pub use types::*;

pub use check::{check, check_index};
pub use dedupe::{dedupe, dedupe_index};
pub use engine::{load_index, save_index};
pub use index::{ConcurrentIndexer, index_dir};
pub use query::{diff_indexes, index_stats, locate};
pub use repo::{Repo, find_repository_root, init_repo, reset_repo, resolve_index_path};
pub use verify::{verify, verify_index};

/// Result alias used by the public boxfile API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Index the repository that contains `start` with `opts`, using its own index document.
///
/// ```ignore
/// let summary = boxfile::index_repo(std::path::Path::new("."), &boxfile::Opts::default())?;
/// println!("{} new or changed", summary.indexed);
/// ```
pub fn index_repo(start: &std::path::Path, opts: &Opts) -> Result<IndexSummary> {
    let repo = Repo::discover(start)?;
    log::debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    index_dir(&repo.root, &repo.index_path, opts)
}
