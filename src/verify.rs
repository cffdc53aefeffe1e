//! Read-only integrity check: rehash every indexed path and compare with its recorded digest.

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::engine::hashing::{digest_equals, hash_file};
use crate::engine::parallel::worker_count;
use crate::engine::progress::{finish_bar, optional_bar, update_progress_bar};
use crate::engine::store::load_index;
use crate::{CorruptFile, Digest, Index, Opts, VerifyReport};

/// Classification of one (digest, path) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyStatus {
    Ok,
    Corrupt { actual: Digest },
    Missing,
    Error(String),
}

/// Check a single path against `expected`.
pub fn verify_file(expected: &str, path: &Path) -> VerifyStatus {
    if !path.exists() {
        return VerifyStatus::Missing;
    }
    match hash_file(path) {
        Ok(actual) if digest_equals(&actual, expected) => VerifyStatus::Ok,
        Ok(actual) => VerifyStatus::Corrupt { actual },
        Err(e) => VerifyStatus::Error(format!("{:#}", e)),
    }
}

/// Verify every path in `index` on a bounded pool. Never touches the index or the files.
pub fn verify_index(index: &Index, opts: &Opts) -> Result<VerifyReport> {
    let tasks: Vec<(&str, PathBuf)> = index
        .iter()
        .flat_map(|(digest, entry)| {
            entry
                .paths
                .iter()
                .map(move |p| (digest.as_str(), PathBuf::from(p)))
        })
        .collect();
    debug!("Verifying {} files against stored digests", tasks.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count(opts.num_threads))
        .build()
        .context("build verify thread pool")?;
    let bar = optional_bar(opts.verbose, tasks.len(), "Verifying");

    let results: Vec<(&str, PathBuf, VerifyStatus)> = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|(expected, path)| {
                let status = verify_file(expected, &path);
                if let Some(bar) = &bar {
                    update_progress_bar(bar, 1);
                }
                (expected, path, status)
            })
            .collect()
    });
    finish_bar(&bar, results.len());

    let mut report = VerifyReport::default();
    for (expected, path, status) in results {
        match status {
            VerifyStatus::Ok => report.ok += 1,
            VerifyStatus::Corrupt { actual } => report.corrupt.push(CorruptFile {
                path,
                expected: expected.to_string(),
                actual,
            }),
            VerifyStatus::Missing => report.missing.push(path),
            VerifyStatus::Error(msg) => report.errors.push((path, msg)),
        }
    }
    Ok(report)
}

/// Load the index at `index_path` and verify it.
pub fn verify(index_path: &Path, opts: &Opts) -> Result<VerifyReport> {
    let index = load_index(index_path);
    verify_index(&index, opts)
}
