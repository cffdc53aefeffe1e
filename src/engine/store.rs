//! Index document persistence: tolerant load, atomic save.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::Index;
use crate::utils::config::PackagePaths;
use crate::utils::tempfiles::write_atomic;

/// Load the index at `path`. A missing or malformed document yields an empty index.
///
/// `path` may be an index file or a repository root (resolved to `<root>/.boxfile/index.json`).
pub fn load_index(path: &Path) -> Index {
    let file = index_file_for(path);
    let text = match std::fs::read_to_string(&file) {
        Ok(t) => t,
        Err(e) => {
            debug!("No index at {} ({}); starting empty", file.display(), e);
            return Index::new();
        }
    };
    match serde_json::from_str::<Index>(&text) {
        Ok(index) => {
            debug!("Loaded {} entries from {}", index.len(), file.display());
            index
        }
        Err(e) => {
            warn!(
                "Index at {} is not readable ({}); treating as empty",
                file.display(),
                e
            );
            Index::new()
        }
    }
}

/// Serialize `index` deterministically and atomically replace the document at `path`.
/// Creates the parent directory if needed.
pub fn save_index(index: &Index, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(index).context("serialize index")?;
    write_atomic(path, &json).with_context(|| format!("save index to {}", path.display()))?;
    debug!("Saved {} entries to {}", index.len(), path.display());
    Ok(())
}

/// Directories resolve to the repository's index document; anything else is taken as-is.
fn index_file_for(path: &Path) -> PathBuf {
    if path.is_dir() {
        PackagePaths::get().index_path(path)
    } else {
        path.to_path_buf()
    }
}
