//! Incremental change detection from the signatures recorded in the loaded index.

use std::collections::HashMap;
use std::fs::Metadata;

use super::tools::{modified_ns, mtime_changed};
use crate::utils::config::MTIME_EPSILON_NS;
use crate::{Digest, Index};

/// What was recorded for a path on the last pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub digest: Digest,
    pub mtime_ns: i64,
    pub size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Size equal and mtime within tolerance: reuse the recorded digest.
    Unchanged,
    NeedsHash,
}

/// Read-only path → signature lookup, shared by all workers of an index pass.
#[derive(Debug, Default)]
pub struct Reconciler {
    signatures: HashMap<String, Signature>,
    tolerance_ns: i64,
}

impl Reconciler {
    pub fn from_index(index: &Index) -> Self {
        let mut signatures = HashMap::new();
        for (digest, entry) in index {
            for path in &entry.paths {
                signatures.insert(
                    path.clone(),
                    Signature {
                        digest: digest.clone(),
                        mtime_ns: entry.path_mtime_ns(path),
                        size: entry.size,
                    },
                );
            }
        }
        Reconciler {
            signatures,
            tolerance_ns: MTIME_EPSILON_NS,
        }
    }

    pub fn with_tolerance_ns(mut self, tolerance_ns: i64) -> Self {
        self.tolerance_ns = tolerance_ns;
        self
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Digest `path` was recorded under, if any.
    pub fn previous_digest(&self, path: &str) -> Option<&str> {
        self.signatures.get(path).map(|s| s.digest.as_str())
    }

    /// Classify `path` against its live metadata.
    pub fn classify(&self, path: &str, live: &Metadata) -> Reconciliation {
        self.classify_signature(path, modified_ns(live), live.len())
    }

    /// Classify from an already extracted (mtime, size) pair.
    pub fn classify_signature(&self, path: &str, mtime_ns: i64, size: u64) -> Reconciliation {
        match self.signatures.get(path) {
            Some(sig)
                if sig.size == size && !mtime_changed(mtime_ns, sig.mtime_ns, self.tolerance_ns) =>
            {
                Reconciliation::Unchanged
            }
            _ => Reconciliation::NeedsHash,
        }
    }
}
