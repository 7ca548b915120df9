//! Memlayout CLI - Draw memory layout diagrams from indented text

mod cli;

use clap::Parser;

fn main() {
    // Logging is configured by `run` from the parsed flags
    let cli_args = cli::Cli::parse();

    let app = cli::MemlayoutApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
