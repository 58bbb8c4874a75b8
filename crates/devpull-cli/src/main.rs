//! Binary entrypoint for the devpull command-line tool.

use std::process;

fn main() {
    let exit_code = devpull_cli::run();
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
