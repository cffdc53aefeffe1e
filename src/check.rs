//! Consistency check: find indexed paths that no longer exist; optionally prune them.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::engine::store::{load_index, save_index};
use crate::{CheckReport, Digest, Index};

/// Partition every entry's paths into existing and missing. With `prune`, rewrite each entry
/// to its existing paths and delete entries left empty; otherwise only report.
pub fn check_index(index: &mut Index, prune: bool) -> CheckReport {
    let mut report = CheckReport {
        pruned: prune,
        ..Default::default()
    };
    let mut emptied: Vec<Digest> = Vec::new();

    for (digest, entry) in index.iter_mut() {
        let missing: Vec<String> = entry
            .paths
            .iter()
            .filter(|p| !Path::new(p.as_str()).exists())
            .cloned()
            .collect();
        if missing.is_empty() {
            continue;
        }
        for p in &missing {
            debug!("Missing: {}", p);
        }
        report.missing.extend(missing.iter().map(PathBuf::from));

        if prune {
            entry.retain_paths(|p| !missing.iter().any(|m| m == p));
            if entry.paths.is_empty() {
                emptied.push(digest.clone());
            }
        }
    }

    report.entries_removed = emptied.len();
    for digest in emptied {
        index.remove(&digest);
    }
    report
}

/// Load the index at `index_path` and check it. Saves only when `prune` is set.
pub fn check(index_path: &Path, prune: bool) -> Result<CheckReport> {
    let mut index = load_index(index_path);
    let report = check_index(&mut index, prune);
    if prune {
        save_index(&index, index_path)?;
    }
    Ok(report)
}
