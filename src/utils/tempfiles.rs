use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

/// Sibling temp path used while writing `target` (e.g. `index.json` → `index.json.tmp`).
pub fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(PackagePaths::INDEX_FILENAME);
    target
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Write `bytes` to the temp sibling of `target`, flush to disk, then rename over `target`.
/// Until the rename succeeds the previous `target` is untouched; on failure the temp is removed.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let temp_path = temp_path_for(target);
    let written = write_temp(&temp_path, bytes).and_then(|_| rename_temp_to_final(&temp_path, target));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path)
        .with_context(|| format!("create temp file {}", temp_path.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("write temp file {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("flush temp file {}", temp_path.display()))?;
    Ok(())
}

pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "atomic rename temp file to final path ({} -> {})",
            temp_path.display(),
            final_path.display()
        )
    })
}
