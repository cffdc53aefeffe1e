//! Per-file metadata capture.

use std::io;
use std::path::Path;

use super::tools::{created_ns, modified_ns};
use crate::FileMeta;

/// Content type recorded when classification is not possible.
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Supplies size, content type and timestamps for a path. Stat failures are errors;
/// classification failures degrade to [`UNKNOWN_CONTENT_TYPE`].
pub trait MetadataProbe: Send + Sync {
    fn probe(&self, path: &Path) -> io::Result<FileMeta>;
}

/// Default probe: `std::fs::metadata` plus a MIME type guessed by `mime_guess`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MimeProbe;

impl MimeProbe {
    pub fn content_type(path: &Path) -> String {
        mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string())
    }
}

impl MetadataProbe for MimeProbe {
    fn probe(&self, path: &Path) -> io::Result<FileMeta> {
        let meta = std::fs::metadata(path)?;
        Ok(FileMeta {
            size: meta.len(),
            content_type: Self::content_type(path),
            created_at_ns: created_ns(&meta),
            modified_at_ns: modified_ns(&meta),
        })
    }
}
