//! `dsus check` – run the upload checks against a local file.

use anyhow::Result;
use dsus_core::checks::{SystemTools, CONTENT_LENGTH};
use dsus_core::config::DsusConfig;
use dsus_core::{Action, CheckCode, CheckError, Response, UploadChecker, UploadRequest};
use std::path::PathBuf;
use std::time::SystemTime;

/// Arguments of `dsus check`, as given on the command line.
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub body: PathBuf,
    pub filename: String,
    pub dir: String,
    pub changes: Option<String>,
    pub content_length: Option<String>,
    pub action: String,
    pub json: bool,
}

/// Turn CLI arguments into the request the front end would have built.
pub(crate) fn build_request(args: &CheckArgs) -> Result<UploadRequest, CheckError> {
    let action: Action = args.action.parse()?;
    let mut req = UploadRequest::new(args.filename.clone(), args.body.clone())
        .dirname(args.dir.clone())
        .action(action);
    if let Some(changes) = &args.changes {
        req = req.changes(changes.clone());
    }
    if let Some(length) = &args.content_length {
        req = req.header(CONTENT_LENGTH, length.clone());
    }
    Ok(req)
}

pub(crate) fn render(response: &Response, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(response)?)
    } else {
        Ok(response.to_string())
    }
}

/// Run the chain with the system tools. Returns whether the upload was accepted.
pub fn run_check(cfg: &DsusConfig, args: &CheckArgs) -> Result<bool> {
    let tools = SystemTools::from_config(cfg);
    let checker = UploadChecker::new(cfg, tools.collaborators());

    let outcome = build_request(args).and_then(|req| checker.run(&req, SystemTime::now()));
    let response = match &outcome {
        Ok(_) => CheckCode::Ok.response(),
        Err(e) => {
            tracing::info!(
                code = e.code.as_u16(),
                detail = e.detail.as_deref().unwrap_or(""),
                "upload rejected"
            );
            e.response()
        }
    };

    println!("{}", render(&response, args.json)?);
    Ok(outcome.is_ok())
}
