//! Argument surface, validation, and command dispatch.
//!
//! The validation rules mirror the operator contract: at least one action,
//! a device selector for anything touching a device, and source/destination
//! directories matching the requested actions.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use devpull_device::{DeviceProvider, DeviceSelector};
use devpull_engine::{NameFilter, RunRequest};
use devpull_mounted::MountedDeviceProvider;

use crate::output::{render_device_list, render_file_list, render_run_summary};

/// Copy files from a portable device and optionally delete them afterwards.
#[derive(Debug, Parser)]
#[command(
    name = "devpull",
    about = "Copy and delete files from a portable device's object store",
    version
)]
pub(crate) struct Cli {
    /// Friendly name of the device to operate on.
    #[arg(long, alias = "device_friendly_name", value_name = "NAME")]
    pub(crate) device_friendly_name: Option<String>,

    /// Device description to match when no friendly name is given.
    #[arg(long, alias = "device_description", value_name = "TEXT")]
    pub(crate) device_description: Option<String>,

    /// Slash-separated directory path on the device to read from.
    #[arg(long, alias = "source_directory", value_name = "PATH")]
    pub(crate) source_directory: Option<String>,

    /// Local directory receiving copied files.
    #[arg(long, alias = "destination_directory", value_name = "PATH")]
    pub(crate) destination_directory: Option<PathBuf>,

    /// Only act on files whose name contains this substring.
    #[arg(long = "match", value_name = "SUBSTRING")]
    pub(crate) needle: Option<String>,

    /// List the devices currently available.
    #[arg(long, alias = "list_devices")]
    pub(crate) list_devices: bool,

    /// Copy matching files to the destination directory.
    #[arg(long, alias = "copy_files")]
    pub(crate) copy_files: bool,

    /// Delete matching files from the device (after copying, if requested).
    #[arg(long, alias = "delete_files")]
    pub(crate) delete_files: bool,

    /// List matching files without copying or deleting anything.
    #[arg(long, alias = "list_files")]
    pub(crate) list_files: bool,

    /// Device mount declaration, as NAME=PATH[:DESCRIPTION]; repeatable.
    #[arg(long, value_name = "NAME=PATH[:DESCRIPTION]", env = "DEVPULL_MOUNTS")]
    pub(crate) mount: Vec<String>,

    /// Output format for listings and summaries.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) output: OutputFormat,
}

/// Rendering format for stdout output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width columns for humans.
    Table,
    /// Pretty-printed JSON for scripts.
    Json,
}

/// Errors surfaced to the operator, split by origin.
#[derive(Debug)]
pub(crate) enum CliError {
    /// The invocation itself was malformed.
    Validation(String),
    /// The requested work failed.
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: anyhow::Error) -> Self {
        Self::Failure(error)
    }

    /// Process exit code for this error. Every failure maps to 1.
    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Failure(_) => 1,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

pub(crate) fn execute(cli: Cli) -> CliResult<()> {
    validate(&cli)?;

    let provider = MountedDeviceProvider::from_specs(&cli.mount)
        .map_err(|err| CliError::validation(err.describe()))?;

    if cli.list_devices {
        let devices = provider.list_devices().map_err(|err| {
            CliError::failure(anyhow::Error::new(err).context("listing devices"))
        })?;
        render_device_list(&devices, cli.output)?;
        if !(cli.list_files || cli.copy_files || cli.delete_files) {
            return Ok(());
        }
    }

    let selector = DeviceSelector {
        friendly_name: cli.device_friendly_name.clone(),
        description: cli.device_description.clone(),
    };
    let mut session = provider.open(&selector).map_err(|err| {
        CliError::failure(
            anyhow::Error::new(err)
                .context(format!("opening device '{}'", selector.describe())),
        )
    })?;

    let request = RunRequest {
        source_path: cli.source_directory.clone().unwrap_or_default(),
        filter: NameFilter::from_needle(cli.needle.clone()),
        destination: cli.destination_directory.clone(),
        copy: cli.copy_files,
        delete: cli.delete_files,
    };
    let report = devpull_engine::execute(&mut *session, &request)
        .map_err(|err| CliError::failure(anyhow!("{}", err.describe())))?;

    if cli.list_files {
        render_file_list(&report.items, cli.output)?;
        return Ok(());
    }

    render_run_summary(&report, cli.output)?;
    if report.has_failures() {
        return Err(CliError::failure(anyhow!(
            "{} of {} files failed",
            report.failed(),
            report.items.len()
        )));
    }
    Ok(())
}

fn validate(cli: &Cli) -> CliResult<()> {
    let any_action = cli.list_devices || cli.list_files || cli.copy_files || cli.delete_files;
    if !any_action {
        return Err(CliError::validation(
            "no action requested; pass --list-devices, --list-files, --copy-files, or --delete-files",
        ));
    }

    let needs_device = cli.list_files || cli.copy_files || cli.delete_files;
    if needs_device {
        if cli.device_friendly_name.is_none() && cli.device_description.is_none() {
            return Err(CliError::validation(
                "a device is required; pass --device-friendly-name or --device-description",
            ));
        }
        if cli.mount.is_empty() {
            return Err(CliError::validation(
                "no devices declared; pass --mount NAME=PATH or set DEVPULL_MOUNTS",
            ));
        }
    }

    if cli.list_files && (cli.copy_files || cli.delete_files) {
        return Err(CliError::validation(
            "--list-files cannot be combined with --copy-files or --delete-files",
        ));
    }
    if cli.copy_files
        && (cli.source_directory.is_none() || cli.destination_directory.is_none())
    {
        return Err(CliError::validation(
            "--copy-files requires --source-directory and --destination-directory",
        ));
    }
    if (cli.list_files || cli.delete_files) && cli.source_directory.is_none() {
        return Err(CliError::validation(
            "--source-directory is required to list or delete files",
        ));
    }
    Ok(())
}
