// Console Quill - main.rs
// Captures browser console output posted by the capture script into a JSON-lines file.

use clap::Parser;
use console_quill::cli::{dispatch, Cli};
use console_quill::telemetry::init_tracing;
use std::process::exit;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = dispatch(cli) {
        eprintln!("{e:#}");
        exit(1);
    }
}
