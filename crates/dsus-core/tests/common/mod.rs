//! Upload-root fixture and fake collaborators shared by the integration tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use dsus_core::checksum;
use dsus_core::config::DsusConfig;
use dsus_core::external::{
    BinaryValidator, LintParser, LintTag, SignatureCheck, SignatureVerifier,
};

pub const DEB: &str = "pkg_1.0_amd64.deb";
pub const CHANGES: &str = "pkg_1.0_amd64.changes";

/// Temporary upload root with `incoming/`, a .changes and a spooled body.
pub struct Fixture {
    pub root: tempfile::TempDir,
    pub body: PathBuf,
    pub md5: String,
}

impl Fixture {
    /// 2048-byte body listed in the .changes with its real size and MD5.
    pub fn new() -> Self {
        Self::with_extra_files_lines("")
    }

    /// Same as [`Fixture::new`], with `extra` appended to the `Files` field.
    pub fn with_extra_files_lines(extra: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        let incoming = root.path().join("incoming");
        fs::create_dir(&incoming).unwrap();

        let content: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let body = root.path().join("body.tmp");
        fs::write(&body, &content).unwrap();
        let md5 = checksum::md5_prefix(&body, 2048).unwrap();

        let changes = format!(
            "Format: 1.8\nSource: pkg\nVersion: 1.0\nFiles:\n {md5} 2048 utils optional {DEB}\n{extra}"
        );
        fs::write(incoming.join(CHANGES), changes).unwrap();

        Self { root, body, md5 }
    }

    pub fn config(&self) -> DsusConfig {
        DsusConfig {
            upload_root: self.root.path().to_path_buf(),
            time_window_secs: 3600,
            ..DsusConfig::default()
        }
    }

    pub fn incoming(&self) -> PathBuf {
        self.root.path().join("incoming")
    }
}

/// Validator/verifier/lint parser that records which paths it was asked about.
pub struct Recorder {
    pub accept: bool,
    pub seen: RefCell<Vec<&'static str>>,
}

impl Recorder {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl BinaryValidator for Recorder {
    fn valid_deb(&self, _path: &Path) -> bool {
        self.seen.borrow_mut().push("binary");
        self.accept
    }
}

impl SignatureVerifier for Recorder {
    fn check_signature(&self, _path: &Path) -> SignatureCheck {
        self.seen.borrow_mut().push("signature");
        SignatureCheck {
            fingerprint: self.accept.then(|| "0123456789ABCDEF".to_string()),
            rejects: Vec::new(),
        }
    }
}

impl LintParser for Recorder {
    fn parse_lintian_output(&self, _output: &str) -> Vec<LintTag> {
        self.seen.borrow_mut().push("lint");
        Vec::new()
    }
}
