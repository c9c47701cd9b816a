//! The upload checks, one function per rule.
//!
//! Each check reads the request plus whatever earlier checks derived and
//! either returns its own derived value or fails with a single [`CheckCode`].
//! [`UploadChecker`] runs them in the required order.

mod chain;

pub use chain::{Collaborators, SystemTools, UploadChecker, UploadContext};

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::checksum;
use crate::codes::CheckCode;
use crate::error::CheckError;
use crate::external::{BinaryValidator, LintParser, SignatureVerifier};
use crate::manifest::{ChangesManifest, ManifestLoader};
use crate::request::{Action, UploadRequest};

/// Name of the header carrying the body length.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Identifies a check, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStep {
    Filename,
    Headers,
    Destination,
    Changes,
    Size,
    Time,
    Checksum,
    Binary,
    Lintian,
    Signature,
    Files,
}

impl CheckStep {
    pub fn name(self) -> &'static str {
        match self {
            CheckStep::Filename => "filename",
            CheckStep::Headers => "headers",
            CheckStep::Destination => "destination",
            CheckStep::Changes => "changes",
            CheckStep::Size => "size",
            CheckStep::Time => "time",
            CheckStep::Checksum => "checksum",
            CheckStep::Binary => "binary",
            CheckStep::Lintian => "lintian",
            CheckStep::Signature => "signature",
            CheckStep::Files => "files",
        }
    }
}

/// What [`check_changes`] found.
#[derive(Debug, Clone)]
pub struct ChangesCheck {
    /// Resolved path of the .changes file.
    pub path: PathBuf,
    pub manifest: ChangesManifest,
    /// MD5 the manifest records for the uploaded file; `None` for `done`.
    pub md5sum: Option<String>,
}

fn has_parent_component(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Filename must be non-empty.
pub fn check_filename(req: &UploadRequest) -> Result<(), CheckError> {
    if req.filename.is_empty() {
        return Err(CheckError::new(CheckCode::FilenameEmpty));
    }
    Ok(())
}

/// Content-Length must be present; returns its value.
pub fn check_headers(req: &UploadRequest) -> Result<u64, CheckError> {
    let value = req
        .headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| CheckError::new(CheckCode::LengthEmpty))?;
    value.trim().parse::<u64>().map_err(|_| {
        CheckError::with_detail(
            CheckCode::LengthError,
            format!("unparseable Content-Length {value:?}"),
        )
    })
}

/// Resolve the requested directory under `upload_root`; it must exist.
///
/// A leading `/` is dropped so `/incoming` and `incoming` name the same place.
pub fn check_dirname(req: &UploadRequest, upload_root: &Path) -> Result<PathBuf, CheckError> {
    let relative = Path::new(req.dirname.trim_start_matches('/'));
    if has_parent_component(relative) {
        return Err(CheckError::with_detail(
            CheckCode::DestinationError,
            format!("destination {:?} leaves the upload root", req.dirname),
        ));
    }
    let dest = upload_root.join(relative);
    if !dest.is_dir() {
        return Err(CheckError::with_detail(
            CheckCode::DestinationError,
            format!("{} is not a directory", dest.display()),
        ));
    }
    Ok(dest)
}

/// The .changes must be named, exist under `dest` and load. For uploads it
/// must also list the file being sent.
pub fn check_changes(
    req: &UploadRequest,
    dest: &Path,
    loader: &dyn ManifestLoader,
) -> Result<ChangesCheck, CheckError> {
    let name = match req.changes.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(CheckError::new(CheckCode::ChangesEmpty)),
    };

    let reference = Path::new(name);
    if reference.is_absolute() || has_parent_component(reference) {
        return Err(CheckError::with_detail(
            CheckCode::ChangesNotFound,
            format!("changes reference {name:?} leaves the destination"),
        ));
    }
    let path = dest.join(reference);
    if !path.is_file() {
        return Err(CheckError::with_detail(
            CheckCode::ChangesNotFound,
            format!("{} is not a file", path.display()),
        ));
    }

    let manifest = loader.load_changes(&path).map_err(|e| {
        tracing::warn!(path = %path.display(), rejects = ?e.rejects, "changes failed to load");
        CheckError::with_detail(CheckCode::ChangesBadFormat, e.to_string())
    })?;

    if req.action == Action::Done {
        return Ok(ChangesCheck {
            path,
            manifest,
            md5sum: None,
        });
    }

    let md5sum = manifest
        .file(&req.filename)
        .map(|f| f.md5sum.clone())
        .ok_or_else(|| {
            CheckError::with_detail(
                CheckCode::FileUnexpected,
                format!("{} is not listed in {}", req.filename, path.display()),
            )
        })?;

    Ok(ChangesCheck {
        path,
        manifest,
        md5sum: Some(md5sum),
    })
}

/// The size recorded in the manifest must equal the declared length.
pub fn check_size(
    filename: &str,
    manifest: &ChangesManifest,
    length: u64,
) -> Result<(), CheckError> {
    let size = manifest
        .file(filename)
        .map(|f| f.size)
        .ok_or_else(|| CheckError::new(CheckCode::LengthError))?;
    if size != length {
        return Err(CheckError::with_detail(
            CheckCode::LengthError,
            format!("Content-Length {length} but .changes says {size}"),
        ));
    }
    Ok(())
}

/// The .changes must have been written no longer than `window` before `now`.
pub fn check_time(changes: &Path, window: Duration, now: SystemTime) -> Result<(), CheckError> {
    let mtime = fs::metadata(changes)
        .and_then(|m| m.modified())
        .map_err(|e| {
            CheckError::with_detail(
                CheckCode::ChangesNotFound,
                format!("mtime of {}: {}", changes.display(), e),
            )
        })?;
    // An mtime in the future counts as brand new.
    let age = now.duration_since(mtime).unwrap_or(Duration::ZERO);
    if age > window {
        return Err(CheckError::with_detail(
            CheckCode::SessionExpired,
            format!("changes is {}s old, window is {}s", age.as_secs(), window.as_secs()),
        ));
    }
    Ok(())
}

/// The first `length` bytes of the upload must hash to the manifest's MD5 (and
/// to its SHA-256, when one is recorded).
pub fn check_checksum(
    tempfile: &Path,
    length: u64,
    md5sum: Option<&str>,
    sha256: Option<&str>,
) -> Result<(), CheckError> {
    let expected = md5sum.ok_or_else(|| CheckError::new(CheckCode::FileUnexpected))?;
    let digests = checksum::digest_prefix(tempfile, Some(length))
        .map_err(|e| CheckError::with_detail(CheckCode::ChecksumError, format!("{e:#}")))?;

    if !digests.md5.eq_ignore_ascii_case(expected) {
        return Err(CheckError::with_detail(
            CheckCode::ChecksumError,
            format!("md5 {} != {}", digests.md5, expected),
        ));
    }
    if let Some(expected) = sha256 {
        if !digests.sha256.eq_ignore_ascii_case(expected) {
            return Err(CheckError::with_detail(
                CheckCode::ChecksumError,
                format!("sha256 {} != {}", digests.sha256, expected),
            ));
        }
    }
    Ok(())
}

/// The upload must be a valid binary package.
pub fn check_valid_deb(tempfile: &Path, validator: &dyn BinaryValidator) -> Result<(), CheckError> {
    if !validator.valid_deb(tempfile) {
        return Err(CheckError::new(CheckCode::BinaryError));
    }
    Ok(())
}

/// Lintian results do not gate uploads yet; this always passes.
pub fn check_lintian(tempfile: &Path, _parser: &dyn LintParser) -> Result<(), CheckError> {
    tracing::trace!(path = %tempfile.display(), "lintian not enforced");
    Ok(())
}

/// The upload must carry a signature from a trusted key.
pub fn check_signature(
    tempfile: &Path,
    verifier: &dyn SignatureVerifier,
) -> Result<(), CheckError> {
    let check = verifier.check_signature(tempfile);
    match check.fingerprint {
        Some(fingerprint) => {
            tracing::debug!(%fingerprint, "signature trusted");
            Ok(())
        }
        None => Err(CheckError::with_detail(
            CheckCode::SignatureError,
            check.rejects.join("; "),
        )),
    }
}

/// Any reject accumulated while loading the manifest fails the upload.
pub fn check_files(manifest: &ChangesManifest) -> Result<(), CheckError> {
    if !manifest.rejects.is_empty() {
        return Err(CheckError::with_detail(
            CheckCode::FilesError,
            manifest.rejects.join("; "),
        ));
    }
    Ok(())
}
