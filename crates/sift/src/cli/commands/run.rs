//! Implementation of `sift run`.

use std::process::ExitCode;

use super::load_config_or_failure;
use crate::cli::args::RunCommand;

/// Evaluates every query of the configured query file and writes the run file.
pub fn run(cmd: &RunCommand) -> ExitCode {
    let config = match load_config_or_failure(&cmd.config) {
        Ok(config) => config,
        Err(code) => return code,
    };

    match sift_eval::run(&config) {
        Ok(summary) => {
            println!(
                "Evaluated {} queries, results written to {}",
                summary.queries,
                summary.output.display()
            );
            if let Some(feedback) = &config.feedback {
                println!("Expanded queries written to {}", feedback.expansion_output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
