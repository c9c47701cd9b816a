//! Binary package validation via `dpkg-deb --info`.

use std::path::Path;
use std::process::{Command, Stdio};

use super::BinaryValidator;

#[derive(Debug, Clone)]
pub struct DpkgDebValidator {
    program: String,
}

impl DpkgDebValidator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DpkgDebValidator {
    fn default() -> Self {
        Self::new("dpkg-deb")
    }
}

impl BinaryValidator for DpkgDebValidator {
    /// Valid iff `dpkg-deb --info` exits 0. A tool that cannot be run makes every file invalid.
    fn valid_deb(&self, path: &Path) -> bool {
        let output = Command::new(&self.program)
            .arg("--info")
            .arg(path)
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => true,
            Ok(out) => {
                tracing::info!(
                    path = %path.display(),
                    status = out.status.code().unwrap_or_default(),
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "dpkg-deb rejected binary"
                );
                false
            }
            Err(e) => {
                tracing::warn!("failed to run {}: {}", self.program, e);
                false
            }
        }
    }
}
