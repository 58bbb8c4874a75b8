#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Command-line interface for pulling files off portable devices.
//!
//! Wires argument parsing and validation to the transfer/deletion engine
//! and renders listings and run summaries to stdout; logs go to stderr.

mod cli;
mod output;

use clap::Parser;
use devpull_telemetry::{LoggingConfig, init_logging};

/// Parse arguments, run the requested actions, and return the exit code.
#[must_use]
pub fn run() -> i32 {
    let args = cli::Cli::parse();
    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("error: {err:#}");
        return 1;
    }
    match cli::execute(args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}
