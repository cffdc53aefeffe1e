//! Repository layout: discovery, init, reset, and index path resolution.

use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Index;
use crate::engine::store::save_index;
use crate::utils::config::PackagePaths;
use crate::utils::repo_toml::CONFIG_TEMPLATE;
use crate::utils::tempfiles::write_atomic;

/// Paths of an initialized repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repo {
    pub root: PathBuf,
    pub store_dir: PathBuf,
    pub index_path: PathBuf,
    pub config_path: PathBuf,
}

impl Repo {
    pub fn at(root: &Path) -> Self {
        let pkg = PackagePaths::get();
        Repo {
            root: root.to_path_buf(),
            store_dir: pkg.store_dir(root),
            index_path: pkg.index_path(root),
            config_path: pkg.config_path(root),
        }
    }

    /// Find the repository containing `start` (or `start` itself). Errors if none is initialized.
    pub fn discover(start: &Path) -> Result<Self> {
        match find_repository_root(start) {
            Some(root) => Ok(Repo::at(&root)),
            None => bail!(
                "not initialized: no {} directory in {} or any parent (run `init` first)",
                PackagePaths::get().store_dir_name(),
                start.display()
            ),
        }
    }
}

/// Nearest ancestor of `start` (inclusive) that holds the store directory.
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    let start = std::path::absolute(start).ok()?;
    let store = PackagePaths::get().store_dir_name();
    start
        .ancestors()
        .find(|dir| dir.join(store).is_dir())
        .map(Path::to_path_buf)
}

/// Create the store directory with an empty index and a config template.
/// Returns false (and changes nothing) if it already exists.
pub fn init_repo(dir: &Path) -> Result<bool> {
    let repo = Repo::at(dir);
    if repo.store_dir.exists() {
        return Ok(false);
    }
    fs::create_dir_all(&repo.store_dir)
        .with_context(|| format!("create {}", repo.store_dir.display()))?;
    save_index(&Index::new(), &repo.index_path)?;
    write_atomic(&repo.config_path, CONFIG_TEMPLATE.as_bytes())?;
    debug!("Initialized {}", repo.store_dir.display());
    Ok(true)
}

/// Remove the store directory. Files already deleted or linked by clean stay as they are.
pub fn reset_repo(repo: &Repo) -> Result<()> {
    fs::remove_dir_all(&repo.store_dir)
        .with_context(|| format!("remove {}", repo.store_dir.display()))
}

/// Resolve a diff target to an index document: a repository root, the store directory itself,
/// or a direct path to an index file.
pub fn resolve_index_path(target: &Path) -> Result<PathBuf> {
    if target.is_dir() {
        let pkg = PackagePaths::get();
        let repo_index = pkg.index_path(target);
        if repo_index.exists() {
            return Ok(repo_index);
        }
        let direct = target.join(PackagePaths::INDEX_FILENAME);
        let is_store_dir = target
            .file_name()
            .is_some_and(|n| n == pkg.store_dir_name());
        if is_store_dir && direct.exists() {
            return Ok(direct);
        }
        bail!("the directory '{}' is not a valid repository", target.display());
    }
    if target.is_file() {
        return Ok(target.to_path_buf());
    }
    bail!("path '{}' does not exist", target.display())
}
