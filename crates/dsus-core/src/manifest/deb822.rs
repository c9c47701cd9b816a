//! Minimal deb822 reader for the file list of a .changes.
//!
//! Only `Files` and `Checksums-Sha256` are read. Signature validity, field
//! consistency and the remaining checksum fields are left to the archive
//! tooling.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{ChangesManifest, LoadError, ManifestFile, ManifestLoader};

const SIGNED_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

#[derive(Debug, Clone, Copy, Default)]
pub struct Deb822ChangesLoader;

impl Deb822ChangesLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse .changes text. Exposed for callers that already hold the bytes.
    pub fn parse(&self, text: &str) -> Result<ChangesManifest, LoadError> {
        let fields = parse_fields(&strip_clearsign(text));

        let files_field = fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Files"))
            .map(|(_, lines)| lines)
            .ok_or_else(|| LoadError::new("missing Files field"))?;

        let mut manifest = ChangesManifest::default();
        parse_files(files_field, &mut manifest);

        if let Some((_, lines)) = fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Checksums-Sha256"))
        {
            parse_sha256(lines, &mut manifest);
        }

        if manifest.files.is_empty() {
            manifest.rejects.push("Files field lists no files".to_string());
        }

        Ok(manifest)
    }
}

impl ManifestLoader for Deb822ChangesLoader {
    fn load_changes(&self, path: &Path) -> Result<ChangesManifest, LoadError> {
        let text = fs::read_to_string(path)
            .map_err(|e| LoadError::new(format!("read {}: {}", path.display(), e)))?;
        let manifest = self.parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            files = manifest.files.len(),
            rejects = manifest.rejects.len(),
            "loaded changes"
        );
        Ok(manifest)
    }
}

/// Drop an OpenPGP clear-sign wrapper, if present, and undo dash-escaping.
fn strip_clearsign(text: &str) -> String {
    let mut lines = text.lines().skip_while(|l| l.trim().is_empty());
    if lines.next().map(str::trim_end) != Some(SIGNED_HEADER) {
        return text.to_string();
    }

    // Armor headers (`Hash: ...`) end at the first blank line.
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    let mut out = String::new();
    for line in lines {
        if line.trim_end() == SIGNATURE_HEADER {
            break;
        }
        let line = line.strip_prefix("- ").unwrap_or(line);
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Split deb822 text into (field name, value lines). The first element of the
/// value lines is the text after the colon; continuation lines follow trimmed.
fn parse_fields(text: &str) -> Vec<(String, Vec<String>)> {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, values)) = fields.last_mut() {
                values.push(line.trim().to_string());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            fields.push((name.trim().to_string(), vec![value.trim().to_string()]));
        }
    }
    fields
}

fn is_hex_digest(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `Files` lines: `<md5> <size> <section> <priority> <name>`.
fn parse_files(lines: &[String], manifest: &mut ChangesManifest) {
    for line in lines.iter().filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 5 {
            manifest.rejects.push(format!("malformed Files line: {line}"));
            continue;
        }
        let (md5, size, name) = (parts[0], parts[1], parts[4]);
        if !is_hex_digest(md5, 32) {
            manifest.rejects.push(format!("{name}: invalid md5sum {md5}"));
            continue;
        }
        let Ok(size) = size.parse::<u64>() else {
            manifest.rejects.push(format!("{name}: invalid size {size}"));
            continue;
        };
        manifest.files.insert(
            name.to_string(),
            ManifestFile {
                size,
                md5sum: md5.to_ascii_lowercase(),
                sha256: None,
            },
        );
    }
}

/// `Checksums-Sha256` lines: `<sha256> <size> <name>`.
fn parse_sha256(lines: &[String], manifest: &mut ChangesManifest) {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for line in lines.iter().filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 || !is_hex_digest(parts[0], 64) {
            manifest
                .rejects
                .push(format!("malformed Checksums-Sha256 line: {line}"));
            continue;
        }
        seen.insert(parts[2].to_string(), parts[0].to_ascii_lowercase());
    }
    for (name, sha) in seen {
        match manifest.files.get_mut(&name) {
            Some(entry) => entry.sha256 = Some(sha),
            None => manifest
                .rejects
                .push(format!("{name}: listed in Checksums-Sha256 but not in Files")),
        }
    }
}
