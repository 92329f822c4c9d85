//! Command implementations and dispatch.

pub mod check;
pub mod query;
pub mod run;

use std::{path::Path, process::ExitCode};

use sift_config::Config;

use super::args::Commands;

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    match command {
        Commands::Run(cmd) => run::run(&cmd),
        Commands::Query(cmd) => query::run(&cmd),
        Commands::Check(cmd) => check::run(&cmd),
    }
}

/// Loads a configuration file or exits with a consistent error.
fn load_config_or_failure(path: &Path) -> Result<Config, ExitCode> {
    Config::load(path).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
