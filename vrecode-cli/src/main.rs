// vrecode-cli/src/main.rs
//
// Entry point for the vrecode binary.
//
// Parses arguments, sets up logging on stderr and runs the convert command
// against stdout. Any error reaching this point is logged and turns into
// exit code 1.

use clap::Parser;
use std::io;
use std::process;
use vrecode_cli::{Cli, logging, run_convert};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run_convert(&cli, &mut out) {
        log::error!("Error: {}", e);
        process::exit(1);
    }
}
