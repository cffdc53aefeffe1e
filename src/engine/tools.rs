//! Path and filter utilities

use anyhow::{Context, Result};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// True if any component of `path` below `root` matches one of `ignored` (glob syntax).
pub fn has_ignored_component(path: &Path, root: &Path, ignored: &[String]) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| is_ignored_name(name, ignored)),
        _ => false,
    })
}

/// True if a single file or directory name matches one of `ignored`.
pub fn is_ignored_name(name: &str, ignored: &[String]) -> bool {
    ignored.iter().any(|pattern| glob_match(pattern, name))
}

/// Returns true if the path should be handed to the workers (not the root, not under an ignored dir).
pub fn should_include_in_walk(path: &Path, root: &Path, ignored: &[String]) -> bool {
    path != root && !has_ignored_component(path, root, ignored)
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                let rest: String = pattern_chars.clone().collect();
                loop {
                    if glob_match(&rest, &text_chars.clone().collect::<String>()) {
                        return true;
                    }
                    if text_chars.next().is_none() {
                        return false;
                    }
                }
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}

/// Check if mtime has changed beyond tolerance window
pub fn mtime_changed(new_mtime: i64, old_mtime: i64, tolerance_ns: i64) -> bool {
    new_mtime.abs_diff(old_mtime) > tolerance_ns.max(0) as u64
}

/// Nanoseconds since epoch; negative for times before it.
pub fn system_time_ns(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos().min(i64::MAX as u128) as i64,
        Err(e) => -(e.duration().as_nanos().min(i64::MAX as u128) as i64),
    }
}

pub fn modified_ns(meta: &Metadata) -> i64 {
    meta.modified().map(system_time_ns).unwrap_or(0)
}

/// Birth time when the platform reports it, otherwise the inode change time.
pub fn created_ns(meta: &Metadata) -> i64 {
    match meta.created() {
        Ok(t) => system_time_ns(t),
        Err(_) => change_time_ns(meta),
    }
}

#[cfg(unix)]
fn change_time_ns(meta: &Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    meta.ctime()
        .saturating_mul(1_000_000_000)
        .saturating_add(meta.ctime_nsec())
}

#[cfg(not(unix))]
fn change_time_ns(meta: &Metadata) -> i64 {
    modified_ns(meta)
}

/// Lowercased extension with a leading dot, or empty if none.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

pub fn check_root_and_canonicalize(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("canonicalize {}", path.display()))?;
    anyhow::ensure!(
        canonical.is_dir(),
        "not a directory: {}",
        canonical.display()
    );
    Ok(canonical)
}

/// Human-readable size (B, KB, MB, GB, TB), two decimals.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}
