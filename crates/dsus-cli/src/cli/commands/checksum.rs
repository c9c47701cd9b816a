//! Checksum command: digests of a file as the checksum check would compute them.

use anyhow::Result;
use dsus_core::checksum;
use std::path::Path;

/// Print MD5 and SHA-256 of the given file (or its first `length` bytes).
pub fn run_checksum(path: &Path, length: Option<u64>) -> Result<()> {
    let d = checksum::digest_prefix(path, length)?;
    println!("md5     {}  {}", d.md5, path.display());
    println!("sha256  {}  {}", d.sha256, path.display());
    println!("bytes   {}", d.bytes);
    Ok(())
}
