//! Command-line interface for `sift`.

use std::{io, process::ExitCode};

use clap::Parser;
use sift::cli::{args::Cli, commands};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run(cli.command)
}
