//! End-to-end runs of the check chain against a real upload root on disk.
//!
//! The .changes is read with the deb822 loader; binary, signature and lint
//! collaborators are recorders so no external tools are needed.

mod common;

use std::time::{Duration, SystemTime};

use common::{Fixture, Recorder, CHANGES, DEB};
use dsus_core::checks::{CheckStep, Collaborators};
use dsus_core::manifest::Deb822ChangesLoader;
use dsus_core::{Action, CheckCode, UploadChecker, UploadRequest};

fn request(fx: &Fixture) -> UploadRequest {
    UploadRequest::new(DEB, &fx.body)
        .header("Content-Length", "2048")
        .dirname("/incoming")
        .changes(CHANGES)
}

fn run(
    fx: &Fixture,
    req: &UploadRequest,
    tools: &Recorder,
    now: SystemTime,
) -> (Result<dsus_core::UploadContext, dsus_core::CheckError>, Vec<CheckStep>) {
    let loader = Deb822ChangesLoader::new();
    let cfg = fx.config();
    let checker = UploadChecker::new(
        &cfg,
        Collaborators {
            loader: &loader,
            validator: tools,
            verifier: tools,
            lint: tools,
        },
    );
    let mut steps: Vec<CheckStep> = Vec::new();
    let result = checker.run_observed(req, now, &mut |s: CheckStep| steps.push(s));
    (result, steps)
}

#[test]
fn accepted_upload_derives_length_digest_and_destination() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let (result, steps) = run(&fx, &request(&fx), &tools, SystemTime::now());

    let ctx = result.expect("upload accepted");
    assert_eq!(ctx.length, Some(2048));
    assert_eq!(ctx.md5sum.as_deref(), Some(fx.md5.as_str()));
    assert_eq!(ctx.dest, fx.root.path().join("incoming"));
    assert_eq!(ctx.changes_path, fx.incoming().join(CHANGES));
    assert_eq!(steps, UploadChecker::steps(Action::Upload));
    assert_eq!(*tools.seen.borrow(), vec!["binary", "signature"]);
}

#[test]
fn missing_length_header_stops_at_437() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let req = UploadRequest::new(DEB, &fx.body)
        .dirname("/incoming")
        .changes(CHANGES);
    let (result, steps) = run(&fx, &req, &tools, SystemTime::now());

    let err = result.unwrap_err();
    assert_eq!(err.code, CheckCode::LengthEmpty);
    assert_eq!(err.code.as_u16(), 437);
    assert_eq!(steps, vec![CheckStep::Filename, CheckStep::Headers]);
    assert!(tools.seen.borrow().is_empty());
}

#[test]
fn missing_filename_runs_nothing_else() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let mut req = request(&fx);
    req.filename.clear();
    let (result, steps) = run(&fx, &req, &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::FilenameEmpty);
    assert_eq!(steps, vec![CheckStep::Filename]);
}

#[test]
fn manifest_reject_fails_files_check_last() {
    let fx = Fixture::with_extra_files_lines(" not a valid files line\n");
    let tools = Recorder::new(true);
    let (result, steps) = run(&fx, &request(&fx), &tools, SystemTime::now());

    let err = result.unwrap_err();
    assert_eq!(err.code, CheckCode::FilesError);
    assert_eq!(err.code.as_u16(), 471);
    assert_eq!(steps.last(), Some(&CheckStep::Files));
    assert_eq!(steps.len(), UploadChecker::steps(Action::Upload).len());
}

#[test]
fn length_conflict() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let req = UploadRequest::new(DEB, &fx.body)
        .header("Content-Length", "2047")
        .dirname("incoming")
        .changes(CHANGES);
    let (result, _) = run(&fx, &req, &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::LengthError);
}

#[test]
fn expired_session() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let later = SystemTime::now() + Duration::from_secs(2 * 3600);
    let (result, steps) = run(&fx, &request(&fx), &tools, later);
    assert_eq!(result.unwrap_err().code, CheckCode::SessionExpired);
    assert_eq!(steps.last(), Some(&CheckStep::Time));
}

#[test]
fn corrupted_body_fails_checksum_before_binary_check() {
    let fx = Fixture::new();
    let mut bytes = std::fs::read(&fx.body).unwrap();
    bytes[0] ^= 0xff;
    std::fs::write(&fx.body, bytes).unwrap();

    let tools = Recorder::new(true);
    let (result, _) = run(&fx, &request(&fx), &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::ChecksumError);
    assert!(tools.seen.borrow().is_empty());
}

#[test]
fn invalid_binary_stops_before_signature() {
    let fx = Fixture::new();
    let tools = Recorder::new(false);
    let (result, _) = run(&fx, &request(&fx), &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::BinaryError);
    assert_eq!(*tools.seen.borrow(), vec!["binary"]);
}

#[test]
fn unparseable_changes_is_bad_format() {
    let fx = Fixture::new();
    std::fs::write(fx.incoming().join(CHANGES), "Source: pkg\n").unwrap();
    let tools = Recorder::new(true);
    let (result, _) = run(&fx, &request(&fx), &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::ChangesBadFormat);
}

#[test]
fn unlisted_file_is_unexpected() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let mut req = request(&fx);
    req.filename = "other_1.0_amd64.deb".to_string();
    let (result, _) = run(&fx, &req, &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::FileUnexpected);
}

#[test]
fn done_checks_only_the_changes() {
    let fx = Fixture::new();
    let tools = Recorder::new(false);
    let req = UploadRequest::new(CHANGES, &fx.body)
        .dirname("/incoming")
        .changes(CHANGES)
        .action(Action::Done);
    let (result, steps) = run(&fx, &req, &tools, SystemTime::now());

    let ctx = result.expect("done accepted");
    assert!(ctx.length.is_none());
    assert!(ctx.md5sum.is_none());
    assert_eq!(steps, UploadChecker::steps(Action::Done));
    assert!(tools.seen.borrow().is_empty());
}

#[test]
fn missing_destination() {
    let fx = Fixture::new();
    let tools = Recorder::new(true);
    let req = request(&fx).dirname("/elsewhere");
    let (result, steps) = run(&fx, &req, &tools, SystemTime::now());
    assert_eq!(result.unwrap_err().code, CheckCode::DestinationError);
    assert_eq!(steps.last(), Some(&CheckStep::Destination));
}
