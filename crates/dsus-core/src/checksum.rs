//! Digests over a prefix of the uploaded content.
//!
//! The upload body is spooled to a temporary file that may be longer than the
//! declared Content-Length, so only the declared prefix is hashed.

use anyhow::{Context, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Hex digests of one pass over a file prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixDigests {
    pub md5: String,
    pub sha256: String,
    /// Bytes actually hashed; less than requested when the file is short.
    pub bytes: u64,
}

/// Compute MD5 and SHA-256 of the first `length` bytes of `path` (whole file if `None`).
/// Reads in chunks to keep memory use bounded.
pub fn digest_prefix(path: &Path, length: Option<u64>) -> Result<PrefixDigests> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader: Box<dyn Read> = match length {
        Some(n) => Box::new(f.take(n)),
        None => Box::new(f),
    };
    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut bytes = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        md5.update(&buf[..n]);
        sha256.update(&buf[..n]);
        bytes += n as u64;
    }
    Ok(PrefixDigests {
        md5: hex::encode(md5.finalize()),
        sha256: hex::encode(sha256.finalize()),
        bytes,
    })
}

/// MD5 of the first `length` bytes of `path`, lowercase hex.
pub fn md5_prefix(path: &Path, length: u64) -> Result<String> {
    Ok(digest_prefix(path, Some(length))?.md5)
}
