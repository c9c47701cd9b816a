//! Runs the checks in order and stops at the first failure.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::config::DsusConfig;
use crate::error::CheckError;
use crate::external::{
    BinaryValidator, DpkgDebValidator, GpgvVerifier, LintParser, LintianOutputParser,
    SignatureVerifier,
};
use crate::manifest::{ChangesManifest, Deb822ChangesLoader, ManifestLoader};
use crate::request::{Action, UploadRequest};

use super::{
    check_changes, check_checksum, check_dirname, check_filename, check_files, check_headers,
    check_lintian, check_signature, check_size, check_time, check_valid_deb, CheckStep,
};

const UPLOAD_STEPS: [CheckStep; 11] = [
    CheckStep::Filename,
    CheckStep::Headers,
    CheckStep::Destination,
    CheckStep::Changes,
    CheckStep::Size,
    CheckStep::Time,
    CheckStep::Checksum,
    CheckStep::Binary,
    CheckStep::Lintian,
    CheckStep::Signature,
    CheckStep::Files,
];

// `done` carries no body, so nothing that looks at one applies.
const DONE_STEPS: [CheckStep; 5] = [
    CheckStep::Filename,
    CheckStep::Destination,
    CheckStep::Changes,
    CheckStep::Time,
    CheckStep::Files,
];

/// The external capabilities the chain delegates to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub loader: &'a dyn ManifestLoader,
    pub validator: &'a dyn BinaryValidator,
    pub verifier: &'a dyn SignatureVerifier,
    pub lint: &'a dyn LintParser,
}

/// Process-backed collaborators configured from [`DsusConfig`].
#[derive(Debug, Clone)]
pub struct SystemTools {
    pub loader: Deb822ChangesLoader,
    pub validator: DpkgDebValidator,
    pub verifier: GpgvVerifier,
    pub lint: LintianOutputParser,
}

impl SystemTools {
    pub fn from_config(cfg: &DsusConfig) -> Self {
        Self {
            loader: Deb822ChangesLoader::new(),
            validator: DpkgDebValidator::new(cfg.dpkg_deb.clone()),
            verifier: GpgvVerifier::new(cfg.gpgv.clone(), cfg.keyrings.clone()),
            lint: LintianOutputParser,
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            loader: &self.loader,
            validator: &self.validator,
            verifier: &self.verifier,
            lint: &self.lint,
        }
    }
}

/// Everything the chain derived for an accepted request.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Parsed Content-Length; `None` for `done`.
    pub length: Option<u64>,
    pub dest: PathBuf,
    pub changes_path: PathBuf,
    pub manifest: ChangesManifest,
    /// MD5 the manifest records for the file; `None` for `done`.
    pub md5sum: Option<String>,
}

pub struct UploadChecker<'a> {
    upload_root: PathBuf,
    time_window: Duration,
    tools: Collaborators<'a>,
}

impl<'a> UploadChecker<'a> {
    pub fn new(cfg: &DsusConfig, tools: Collaborators<'a>) -> Self {
        Self {
            upload_root: cfg.upload_root.clone(),
            time_window: Duration::from_secs(cfg.time_window_secs),
            tools,
        }
    }

    /// Checks that apply to `action`, in the order they run.
    pub fn steps(action: Action) -> &'static [CheckStep] {
        match action {
            Action::Upload => &UPLOAD_STEPS,
            Action::Done => &DONE_STEPS,
        }
    }

    pub fn run(&self, req: &UploadRequest, now: SystemTime) -> Result<UploadContext, CheckError> {
        self.run_observed(req, now, &mut |_| {})
    }

    /// Like [`run`](Self::run), calling `observe` before each check starts.
    pub fn run_observed(
        &self,
        req: &UploadRequest,
        now: SystemTime,
        observe: &mut dyn FnMut(CheckStep),
    ) -> Result<UploadContext, CheckError> {
        let upload = req.action == Action::Upload;
        let mut step = |s: CheckStep| {
            observe(s);
            tracing::debug!(check = s.name(), file = %req.filename, "running check");
        };

        step(CheckStep::Filename);
        check_filename(req).map_err(|e| failed(CheckStep::Filename, e))?;

        let length = if upload {
            step(CheckStep::Headers);
            Some(check_headers(req).map_err(|e| failed(CheckStep::Headers, e))?)
        } else {
            None
        };

        step(CheckStep::Destination);
        let dest = check_dirname(req, &self.upload_root)
            .map_err(|e| failed(CheckStep::Destination, e))?;

        step(CheckStep::Changes);
        let changes = check_changes(req, &dest, self.tools.loader)
            .map_err(|e| failed(CheckStep::Changes, e))?;

        if let Some(length) = length {
            step(CheckStep::Size);
            check_size(&req.filename, &changes.manifest, length)
                .map_err(|e| failed(CheckStep::Size, e))?;
        }

        step(CheckStep::Time);
        check_time(&changes.path, self.time_window, now).map_err(|e| failed(CheckStep::Time, e))?;

        if let Some(length) = length {
            let sha256 = changes
                .manifest
                .file(&req.filename)
                .and_then(|f| f.sha256.as_deref());

            step(CheckStep::Checksum);
            check_checksum(&req.tempfile, length, changes.md5sum.as_deref(), sha256)
                .map_err(|e| failed(CheckStep::Checksum, e))?;

            step(CheckStep::Binary);
            check_valid_deb(&req.tempfile, self.tools.validator)
                .map_err(|e| failed(CheckStep::Binary, e))?;

            step(CheckStep::Lintian);
            check_lintian(&req.tempfile, self.tools.lint)
                .map_err(|e| failed(CheckStep::Lintian, e))?;

            step(CheckStep::Signature);
            check_signature(&req.tempfile, self.tools.verifier)
                .map_err(|e| failed(CheckStep::Signature, e))?;
        }

        step(CheckStep::Files);
        check_files(&changes.manifest).map_err(|e| failed(CheckStep::Files, e))?;

        tracing::info!(
            file = %req.filename,
            action = req.action.as_str(),
            dest = %dest.display(),
            "upload accepted"
        );

        Ok(UploadContext {
            length,
            dest,
            changes_path: changes.path,
            manifest: changes.manifest,
            md5sum: changes.md5sum,
        })
    }
}

fn failed(step: CheckStep, e: CheckError) -> CheckError {
    tracing::info!(
        check = step.name(),
        code = e.code.as_u16(),
        detail = e.detail.as_deref().unwrap_or(""),
        "check failed"
    );
    e
}
