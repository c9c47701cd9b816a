//! Parsed .changes manifests and the loader seam.
//!
//! The checks never parse a .changes themselves; they go through
//! [`ManifestLoader`]. [`Deb822ChangesLoader`] is the default implementation,
//! which only extracts the file list.

mod deb822;

pub use deb822::Deb822ChangesLoader;

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Size and digests the .changes records for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub size: u64,
    /// Lowercase hex MD5 from the `Files` field.
    pub md5sum: String,
    /// Lowercase hex SHA-256 from `Checksums-Sha256`, when listed.
    pub sha256: Option<String>,
}

/// A loaded .changes: its file list plus every complaint raised while loading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangesManifest {
    pub files: BTreeMap<String, ManifestFile>,
    pub rejects: Vec<String>,
}

impl ChangesManifest {
    pub fn file(&self, name: &str) -> Option<&ManifestFile> {
        self.files.get(name)
    }

    pub fn is_clean(&self) -> bool {
        self.rejects.is_empty()
    }
}

/// Loading failed outright; the rejects say why.
#[derive(Debug, Clone, Error)]
#[error("changes rejected: {}", .rejects.join("; "))]
pub struct LoadError {
    pub rejects: Vec<String>,
}

impl LoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            rejects: vec![reason.into()],
        }
    }
}

/// Parses a .changes file into a [`ChangesManifest`].
///
/// Problems that do not prevent reading the file list should be recorded in
/// `ChangesManifest::rejects` rather than failing the load.
pub trait ManifestLoader {
    fn load_changes(&self, path: &Path) -> Result<ChangesManifest, LoadError>;
}
