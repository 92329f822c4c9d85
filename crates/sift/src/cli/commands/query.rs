//! Implementation of `sift query`.

use std::process::ExitCode;

use sift_config::Config;
use sift_eval::{Batch, format_ranking, load_index};
use sift_index::Analyzer;
use sift_query::{QueryLine, parse};

use super::load_config_or_failure;
use crate::cli::args::QueryCommand;

/// Evaluates one query and prints its trec-formatted results, or its parse tree with
/// `--explain`.
pub fn run(cmd: &QueryCommand) -> ExitCode {
    let config = match load_config_or_failure(&cmd.config) {
        Ok(config) => config,
        Err(code) => return code,
    };

    if cmd.explain {
        return explain(&config, &cmd.query);
    }

    let (index, mut analyzer) = match load_index(&config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: failed to load index: {e}");
            return ExitCode::FAILURE;
        }
    };

    let batch = match Batch::new(&index, &config) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let line = QueryLine {
        id: cmd.id.clone(),
        text: cmd.query.clone(),
    };
    let mut outcome = match batch.run_query(&line, &mut analyzer) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(expansion) = &outcome.expansion {
        eprintln!("expansion: {expansion}");
    }

    match format_ranking(&outcome.id, &mut outcome.ranking, &index, &config.run.run_id) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints the parsed, analyzed query tree.
fn explain(config: &Config, query: &str) -> ExitCode {
    let mut analyzer = match Analyzer::new(&config.index.stemmer) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match parse(query, &config.model, &mut analyzer) {
        Ok(Some(tree)) => {
            println!("Model: {}", config.model);
            println!("Query: {}", tree.to_query_string());
            println!();
            print!("{tree}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("Model: {}", config.model);
            println!("Query has no terms after analysis.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
