//! Duplicate cleanup: keep the canonical copy of each multi-path entry, delete or link the rest.

use anyhow::Result;
use log::{error, info, warn};
use std::io;
use std::path::{Path, PathBuf};

use crate::engine::filters::should_index;
use crate::engine::store::{load_index, save_index};
use crate::{DedupeReport, Index, IndexFilters, digest_prefix};

/// What happened to one non-canonical path.
enum DuplicateFate {
    Deleted,
    Linked,
    /// Stays in the entry: already a link, or removal failed.
    Retained,
    /// Gone from disk before we got to it.
    Vanished,
}

/// Clean duplicates in `index` in place. Entries whose canonical path fails `filters`
/// or no longer exists are left untouched. Filesystem changes are applied one path at a time.
pub fn dedupe_index(
    index: &mut Index,
    use_links: bool,
    filters: Option<&IndexFilters>,
) -> DedupeReport {
    let mut report = DedupeReport::default();

    for (digest, entry) in index.iter_mut() {
        if !entry.is_duplicated() {
            continue;
        }
        let master = entry.paths[0].clone();
        let master_path = Path::new(&master);

        if let Some(filters) = filters
            && !should_index(master_path, filters)
        {
            continue;
        }

        if !master_path.exists() {
            warn!(
                "Master file missing for {}, skipping: {}",
                digest_prefix(digest),
                master
            );
            report.missing_masters.push(digest.clone());
            continue;
        }

        let mut surviving = Vec::new();
        for dup in entry.paths[1..].iter() {
            let dup_path = Path::new(dup);
            match clean_duplicate(dup_path, master_path, use_links, &mut report) {
                DuplicateFate::Deleted => {
                    report.processed += 1;
                    report.bytes_reclaimed += entry.size;
                    report.deleted.push(dup_path.to_path_buf());
                }
                DuplicateFate::Linked => {
                    report.processed += 1;
                    report.linked.push(dup_path.to_path_buf());
                }
                DuplicateFate::Retained => surviving.push(dup.clone()),
                DuplicateFate::Vanished => {}
            }
        }

        let mut paths = Vec::with_capacity(surviving.len() + 1);
        paths.push(master);
        paths.extend(surviving);
        entry.set_paths(paths);
    }

    report
}

fn clean_duplicate(
    dup: &Path,
    master: &Path,
    use_links: bool,
    report: &mut DedupeReport,
) -> DuplicateFate {
    let meta = match std::fs::symlink_metadata(dup) {
        Ok(m) => m,
        Err(_) => return DuplicateFate::Vanished,
    };
    if meta.file_type().is_symlink() {
        // Existing links are never re-linked or unlinked.
        return DuplicateFate::Retained;
    }

    if let Err(e) = std::fs::remove_file(dup) {
        error!("Error deleting {}: {}", dup.display(), e);
        report.failed.push((dup.to_path_buf(), e.to_string()));
        return DuplicateFate::Retained;
    }

    if !use_links {
        info!("Deleted: {}", dup.display());
        return DuplicateFate::Deleted;
    }

    match replace_with_link(master, dup) {
        Ok(()) => {
            info!("Linked: {} -> {}", dup.display(), master.display());
            DuplicateFate::Linked
        }
        Err(e) => {
            // The duplicate is already gone; nothing is left at this path to keep in the index.
            error!("Error creating link {}: {}", dup.display(), e);
            report.failed.push((dup.to_path_buf(), e.to_string()));
            DuplicateFate::Vanished
        }
    }
}

/// Create a symlink at `link` pointing to the absolute form of `target`, clearing whatever is there first.
fn replace_with_link(target: &Path, link: &Path) -> io::Result<()> {
    if std::fs::symlink_metadata(link).is_ok() {
        std::fs::remove_file(link)?;
    }
    let target = absolute_target(target)?;
    symlink_file(&target, link)
}

fn absolute_target(target: &Path) -> io::Result<PathBuf> {
    if target.is_absolute() {
        Ok(target.to_path_buf())
    } else {
        std::path::absolute(target)
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Load the index at `index_path`, clean duplicates, save it back (always).
pub fn dedupe(index_path: &Path, use_links: bool, filters: Option<&IndexFilters>) -> Result<DedupeReport> {
    let mut index = load_index(index_path);
    let report = dedupe_index(&mut index, use_links, filters);
    save_index(&index, index_path)?;
    Ok(report)
}
