//! Spritescan - command-line tool for scanning sprite sheets

use std::process::ExitCode;

use spritescan::cli;

fn main() -> ExitCode {
    cli::run()
}
