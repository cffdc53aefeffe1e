//! File hashing utilities

use anyhow::{Context, Result};
use blake3::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::Digest;
use crate::utils::config::HashingConsts;

/// Hash a file's content with blake3, streaming it in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<Digest> {
    hash_file_chunked(path, HashingConsts::HASH_READ_CHUNK_SIZE)
}

/// [`hash_file`] with an explicit chunk size. The digest does not depend on it.
pub fn hash_file_chunked(path: &Path, chunk_size: usize) -> Result<Digest> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    hash_reader(file, chunk_size).with_context(|| format!("read {}", path.display()))
}

/// Hash everything `reader` yields. Memory use is bounded by `chunk_size`.
pub fn hash_reader<R: Read>(mut reader: R, chunk_size: usize) -> std::io::Result<Digest> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Digest of an in-memory buffer.
pub fn hash_bytes(bytes: &[u8]) -> Digest {
    blake3::hash(bytes).to_hex().to_string()
}

/// Compare two digests, ignoring hex case.
pub fn digest_equals(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
