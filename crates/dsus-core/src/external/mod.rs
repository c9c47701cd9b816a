//! Seams to the archive tooling the checks delegate to.
//!
//! Each trait has a process-backed default: `dpkg-deb` for binary packages,
//! `gpgv` for signatures, and a parser for lintian's text output.

mod dpkg;
mod gpgv;
mod lintian;

pub use dpkg::DpkgDebValidator;
pub use gpgv::{parse_status, GpgvVerifier};
pub use lintian::LintianOutputParser;

use std::path::Path;

/// Decides whether a file is a structurally valid binary package.
pub trait BinaryValidator {
    fn valid_deb(&self, path: &Path) -> bool;
}

/// Outcome of a signature check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureCheck {
    /// Fingerprint of the trusted key that made a good signature.
    pub fingerprint: Option<String>,
    pub rejects: Vec<String>,
}

/// Verifies the signature on a file against the configured keyrings.
pub trait SignatureVerifier {
    fn check_signature(&self, path: &Path) -> SignatureCheck;
}

/// One lintian finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintTag {
    /// Single-letter level: E, W, I, P, X, O, N.
    pub severity: char,
    pub package: String,
    /// `binary`, `source` or `udeb` when lintian prints it.
    pub package_type: Option<String>,
    pub tag: String,
    pub info: Option<String>,
}

/// Turns lintian output into tags. Not used to gate uploads yet.
pub trait LintParser {
    fn parse_lintian_output(&self, output: &str) -> Vec<LintTag>;
}
