//! Command-line interface definitions for the `devicefarm` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `devicefarm` binary.
#[derive(Debug, Parser)]
#[command(
    name = "devicefarm",
    about = "Manage device pools and app uploads on AWS Device Farm",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Search the device catalogue.
    #[command(name = "devices", about = "Search the device catalogue")]
    Devices(DevicesCommand),
    /// List the device pools of a project.
    #[command(name = "pools", about = "List the device pools of a project")]
    Pools(PoolsCommand),
    /// Create or update a device pool so it selects exactly the given devices.
    #[command(
        name = "pool",
        about = "Create or update a device pool so it selects exactly the given devices"
    )]
    Pool(PoolCommand),
    /// Upload an artifact and wait for it to be processed.
    #[command(name = "upload", about = "Upload an artifact and wait for it to be processed")]
    Upload(UploadCommand),
    /// Wait for existing uploads to finish processing.
    #[command(name = "wait", about = "Wait for existing uploads to finish processing")]
    Wait(WaitCommand),
}

/// Arguments for the `devicefarm devices` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DevicesCommand {
    /// Only show devices whose name contains this text (case-insensitive).
    #[arg(long, short, value_name = "TEXT", default_value = "")]
    pub(crate) query: String,
    /// Only show Android devices.
    #[arg(long)]
    pub(crate) android: bool,
    /// Only show iOS devices.
    #[arg(long)]
    pub(crate) ios: bool,
}

/// Arguments for the `devicefarm pools` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct PoolsCommand {
    /// Project ARN; defaults to the configured `project_arn`.
    #[arg(long, value_name = "ARN")]
    pub(crate) project: Option<String>,
}

/// Arguments for the `devicefarm pool` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct PoolCommand {
    /// Name of the pool to create or update.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: String,
    /// Project ARN; defaults to the configured `project_arn`.
    #[arg(long, value_name = "ARN")]
    pub(crate) project: Option<String>,
    /// Device ARNs the pool must select.
    #[arg(required = true, value_name = "DEVICE_ARN")]
    pub(crate) devices: Vec<String>,
}

/// Arguments for the `devicefarm upload` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct UploadCommand {
    /// Upload type understood by the service, for example `ANDROID_APP`.
    #[arg(long = "type", value_name = "TYPE")]
    pub(crate) kind: String,
    /// Upload name; defaults to the file name prefixed with the git branch.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// Project ARN; defaults to the configured `project_arn`.
    #[arg(long, value_name = "ARN")]
    pub(crate) project: Option<String>,
    /// Command to run in the current directory before uploading. Repeatable;
    /// commands run in order and the upload is skipped if one fails.
    #[arg(long = "before", value_name = "COMMAND")]
    pub(crate) before: Vec<String>,
    /// Artifact to upload.
    #[arg(value_name = "FILE")]
    pub(crate) file: String,
}

/// Arguments for the `devicefarm wait` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct WaitCommand {
    /// Override the configured wait budget, in milliseconds.
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub(crate) timeout_ms: Option<i64>,
    /// Override the configured pause between checks, in milliseconds.
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub(crate) interval_ms: Option<i64>,
    /// Upload ARNs to wait for.
    #[arg(required = true, value_name = "UPLOAD_ARN")]
    pub(crate) uploads: Vec<String>,
}
