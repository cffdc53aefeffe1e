//! Candidate filtering shared by index and clean.

use std::path::Path;

use super::tools::{created_ns, dotted_extension};
use crate::IndexFilters;

/// True if `path` passes `filters`. Symlinks, unreadable paths and anything failing a criterion are rejected.
pub fn should_index(path: &Path, filters: &IndexFilters) -> bool {
    let Ok(link_meta) = std::fs::symlink_metadata(path) else {
        return false;
    };
    if link_meta.file_type().is_symlink() {
        return false;
    }

    if let Some(exts) = &filters.extensions
        && !exts.contains(&dotted_extension(path))
    {
        return false;
    }

    if link_meta.len() < filters.min_size_bytes {
        return false;
    }

    if let Some(after) = filters.after_ns
        && created_ns(&link_meta) < after
    {
        return false;
    }

    true
}
