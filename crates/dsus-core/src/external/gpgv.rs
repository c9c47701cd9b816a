//! Signature verification via `gpgv --status-fd 1`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{SignatureCheck, SignatureVerifier};

const STATUS_PREFIX: &str = "[GNUPG:] ";

#[derive(Debug, Clone)]
pub struct GpgvVerifier {
    program: String,
    keyrings: Vec<PathBuf>,
}

impl GpgvVerifier {
    pub fn new(program: impl Into<String>, keyrings: Vec<PathBuf>) -> Self {
        Self {
            program: program.into(),
            keyrings,
        }
    }
}

impl SignatureVerifier for GpgvVerifier {
    fn check_signature(&self, path: &Path) -> SignatureCheck {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--status-fd").arg("1");
        for keyring in &self.keyrings {
            cmd.arg("--keyring").arg(keyring);
        }
        cmd.arg(path).stdin(Stdio::null());

        let out = match cmd.output() {
            Ok(out) => out,
            Err(e) => {
                return SignatureCheck {
                    fingerprint: None,
                    rejects: vec![format!("failed to run {}: {}", self.program, e)],
                }
            }
        };

        let mut check = parse_status(&String::from_utf8_lossy(&out.stdout));
        if !out.status.success() && check.fingerprint.is_some() {
            // gpgv saw a good signature but still failed (e.g. a second, bad one).
            check.fingerprint = None;
            check
                .rejects
                .push(format!("gpgv exited with status {}", out.status.code().unwrap_or(-1)));
        }
        check
    }
}

/// Interpret gpgv status lines. `VALIDSIG` yields the fingerprint; `BADSIG`,
/// `ERRSIG`, `NO_PUBKEY`, `EXPKEYSIG` and `REVKEYSIG` are rejects and cancel it.
pub fn parse_status(output: &str) -> SignatureCheck {
    let mut fingerprint = None;
    let mut rejects = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix(STATUS_PREFIX) else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let keyword = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default();
        match keyword {
            "VALIDSIG" if !arg.is_empty() => fingerprint = Some(arg.to_string()),
            "BADSIG" => rejects.push(format!("bad signature from key {arg}")),
            "ERRSIG" => rejects.push(format!("cannot check signature from key {arg}")),
            "NO_PUBKEY" => rejects.push(format!("key {arg} not found in keyring")),
            "EXPKEYSIG" => rejects.push(format!("signature by expired key {arg}")),
            "REVKEYSIG" => rejects.push(format!("signature by revoked key {arg}")),
            "NODATA" => rejects.push("no signature found".to_string()),
            _ => {}
        }
    }
    if !rejects.is_empty() {
        fingerprint = None;
    }
    SignatureCheck {
        fingerprint,
        rejects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validsig_gives_fingerprint() {
        let out = "[GNUPG:] NEWSIG\n\
                   [GNUPG:] GOODSIG 1234ABCD Some One <one@example.org>\n\
                   [GNUPG:] VALIDSIG 0123456789ABCDEF0123456789ABCDEF1234ABCD 2024-01-01 1704067200 0 4 0 1 10 01 0123456789ABCDEF0123456789ABCDEF1234ABCD\n";
        let c = parse_status(out);
        assert_eq!(
            c.fingerprint.as_deref(),
            Some("0123456789ABCDEF0123456789ABCDEF1234ABCD")
        );
        assert!(c.rejects.is_empty());
    }

    #[test]
    fn missing_key_is_reject() {
        let out = "[GNUPG:] ERRSIG 1234ABCD 1 10 01 1704067200 9 -\n[GNUPG:] NO_PUBKEY 1234ABCD\n";
        let c = parse_status(out);
        assert!(c.fingerprint.is_none());
        assert_eq!(c.rejects.len(), 2);
    }

    #[test]
    fn unsigned_file() {
        let c = parse_status("[GNUPG:] NODATA 1\n");
        assert!(c.fingerprint.is_none());
        assert_eq!(c.rejects, vec!["no signature found".to_string()]);
    }

    #[test]
    fn non_status_lines_ignored() {
        let c = parse_status("gpgv: Signature made ...\n");
        assert_eq!(c, SignatureCheck::default());
    }

    #[test]
    fn missing_program_has_no_fingerprint() {
        let v = GpgvVerifier::new("/nonexistent/gpgv-for-tests", vec![]);
        let c = v.check_signature(Path::new("/dev/null"));
        assert!(c.fingerprint.is_none());
        assert_eq!(c.rejects.len(), 1);
    }
}
