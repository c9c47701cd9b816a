//! Tests for codes, checksum and global options.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_codes() {
    match parse(&["dsus", "codes"]) {
        CliCommand::Codes => {}
        _ => panic!("expected Codes"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["dsus", "checksum", "/tmp/pkg.deb"]) {
        CliCommand::Checksum { path, length } => {
            assert_eq!(path, std::path::Path::new("/tmp/pkg.deb"));
            assert!(length.is_none());
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_length() {
    match parse(&["dsus", "checksum", "x.deb", "--length", "2048"]) {
        CliCommand::Checksum { length, .. } => assert_eq!(length, Some(2048)),
        _ => panic!("expected Checksum with --length"),
    }
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["dsus", "codes", "--config", "/etc/dsus.toml"]).unwrap();
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/etc/dsus.toml"))
    );
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["dsus", "serve"]).is_err());
}
