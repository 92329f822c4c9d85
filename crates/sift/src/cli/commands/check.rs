//! Implementation of `sift check`.

use std::{path::Path, process::ExitCode};

use sift_config::Config;

use super::load_config_or_failure;
use crate::cli::args::CheckCommand;

/// Validates a configuration, prints the resolved settings and reports missing input files.
pub fn run(cmd: &CheckCommand) -> ExitCode {
    println!("Checking {}...", cmd.config.display());
    println!();

    let config = match load_config_or_failure(&cmd.config) {
        Ok(config) => config,
        Err(code) => return code,
    };

    print_settings(&config);

    let mut missing = Vec::new();
    check_exists("index.path", &config.index.path, &mut missing);
    check_exists("run.queries", &config.run.queries, &mut missing);
    if let Some(path) = config.feedback.as_ref().and_then(|f| f.initial_ranking.as_ref()) {
        check_exists("feedback.initial_ranking", path, &mut missing);
    }

    if missing.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("Missing files ({}):", missing.len());
    for line in &missing {
        println!("  - {line}");
    }
    ExitCode::FAILURE
}

/// Prints the resolved configuration.
fn print_settings(config: &Config) {
    println!("Model: {}", config.model);
    println!("Corpus: {} (stemmer: {})", config.index.path.display(), config.index.stemmer);
    println!("Queries: {}", config.run.queries.display());
    println!("Output: {}", config.run.output.display());
    println!(
        "Run: id {}, limit {}, threads {}",
        config.run.run_id, config.run.limit, config.run.threads
    );
    match &config.feedback {
        Some(feedback) => {
            println!(
                "Feedback: docs {}, terms {}, mu {}, orig_weight {}",
                feedback.docs, feedback.terms, feedback.mu, feedback.orig_weight
            );
            if let Some(path) = &feedback.initial_ranking {
                println!("  initial ranking: {}", path.display());
            }
            println!("  expansion output: {}", feedback.expansion_output.display());
        }
        None => println!("Feedback: disabled"),
    }
    println!();
}

/// Records `key` in `missing` if `path` does not exist.
fn check_exists(key: &str, path: &Path, missing: &mut Vec<String>) {
    if !path.exists() {
        missing.push(format!("{key}: {}", path.display()));
    }
}
