//! CLI for the DSUS upload checks.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dsus_core::config;
use std::path::PathBuf;

use commands::{run_check, run_checksum, run_codes, CheckArgs};

/// Top-level CLI for the DSUS upload checks.
#[derive(Debug, Parser)]
#[command(name = "dsus")]
#[command(about = "DSUS: upload acceptance checks for a Debian archive", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/dsus/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the upload checks against a spooled request body.
    Check {
        /// File holding the uploaded bytes.
        body: PathBuf,

        /// Name of the uploaded file as listed in the .changes.
        #[arg(long, default_value = "")]
        filename: String,

        /// Destination directory, relative to the upload root.
        #[arg(long, default_value = "")]
        dir: String,

        /// Name of the .changes file in the destination.
        #[arg(long)]
        changes: Option<String>,

        /// Value of the Content-Length header (omitted = header absent).
        #[arg(long, value_name = "BYTES")]
        content_length: Option<String>,

        /// `upload` or `done`.
        #[arg(long, default_value = "upload")]
        action: String,

        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the response code table.
    Codes,

    /// Print MD5 and SHA-256 of a file (or of its first BYTES bytes).
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Only hash this many leading bytes.
        #[arg(long, value_name = "BYTES")]
        length: Option<u64>,
    },
}

impl CliCommand {
    /// Returns `Ok(false)` when the checks rejected the upload.
    pub fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Check {
                body,
                filename,
                dir,
                changes,
                content_length,
                action,
                json,
            } => {
                let cfg = match &cli.config {
                    Some(path) => config::load_from(path)?,
                    None => config::load_or_init()?,
                };
                tracing::debug!("loaded config: {:?}", cfg);
                let args = CheckArgs {
                    body,
                    filename,
                    dir,
                    changes,
                    content_length,
                    action,
                    json,
                };
                run_check(&cfg, &args)
            }
            CliCommand::Codes => {
                run_codes();
                Ok(true)
            }
            CliCommand::Checksum { path, length } => {
                run_checksum(&path, length)?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests;
