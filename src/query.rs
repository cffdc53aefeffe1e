//! Read-only queries over loaded indexes: stats, locate, diff.

use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::engine::hashing::hash_file;
use crate::utils::config::DIFF_PREVIEW_LIMIT;
use crate::{Digest, Index, IndexDiff, IndexEntry, IndexStats};

pub fn index_stats(index: &Index) -> IndexStats {
    let mut stats = IndexStats {
        unique_contents: index.len(),
        ..Default::default()
    };
    for entry in index.values() {
        let count = entry.paths.len();
        stats.total_files += count;
        stats.total_size += entry.size * count as u64;
        if count > 1 {
            stats.duplicates += count - 1;
            stats.reclaimable += entry.size * (count as u64 - 1);
        }
    }
    stats
}

/// Hash an external file and look its content up in `index`.
pub fn locate<'a>(index: &'a Index, file: &Path) -> Result<(Digest, Option<&'a IndexEntry>)> {
    if !file.exists() {
        bail!("file '{}' not found", file.display());
    }
    if file.is_dir() {
        bail!("'{}' is a directory, please specify a file", file.display());
    }
    let digest = hash_file(file)?;
    let entry = index.get(&digest);
    Ok((digest, entry))
}

/// Compare digest sets of two indexes.
pub fn diff_indexes(local: &Index, remote: &Index) -> IndexDiff {
    let local_keys: BTreeSet<&Digest> = local.keys().collect();
    let remote_keys: BTreeSet<&Digest> = remote.keys().collect();

    let common: Vec<Digest> = local_keys
        .intersection(&remote_keys)
        .map(|d| (*d).clone())
        .collect();
    let local_only: Vec<Digest> = local_keys
        .difference(&remote_keys)
        .map(|d| (*d).clone())
        .collect();
    let remote_only: Vec<Digest> = remote_keys
        .difference(&local_keys)
        .map(|d| (*d).clone())
        .collect();

    let shared_bytes = common.iter().filter_map(|d| local.get(d)).map(|e| e.size).sum();
    let remote_preview = remote_only
        .iter()
        .filter_map(|d| remote.get(d))
        .filter_map(|e| e.canonical_path().map(|p| (PathBuf::from(p), e.size)))
        .take(DIFF_PREVIEW_LIMIT)
        .collect();

    IndexDiff {
        local_total: local.len(),
        remote_total: remote.len(),
        common,
        local_only,
        remote_only,
        shared_bytes,
        remote_preview,
    }
}
