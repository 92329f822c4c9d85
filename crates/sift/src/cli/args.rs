//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Structured-query retrieval runs over a document corpus")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `sift run`.
#[derive(Args, Debug, Clone)]
pub struct RunCommand {
    /// Run configuration file
    pub config: PathBuf,
}

/// Arguments for `sift query`.
#[derive(Args, Debug, Clone)]
pub struct QueryCommand {
    /// Query expression, e.g. '#and(crab #near/2(ocean shell))'
    pub query: String,

    /// Run configuration file
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Query id printed in the first result column
    #[arg(long, default_value = "1")]
    pub id: String,

    /// Show the parsed query tree without searching
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `sift check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    /// Run configuration file
    pub config: PathBuf,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate every query of the configured query file
    Run(RunCommand),

    /// Evaluate a single query and print trec-formatted results
    #[command(after_help = "\
QUERY SYNTAX:
  term                 Term in the body field
  term.title           Term in another field (url, keywords, title, inlink, body)
  #and(a b)            All arguments (boolean, Indri)
  #or(a b)             Any argument (boolean)
  #sum(a b)            Sum of scores (BM25)
  #wand(0.7 a 0.3 b)   Weighted AND (Indri)
  #wsum(0.7 a 0.3 b)   Weighted sum (Indri)
  #syn(a b)            Synonyms, treated as one term
  #near/n(a b)         b follows a within n positions
  #window/n(a b)       a and b within a span of n positions

EXAMPLES:
  sift query -c run.toml 'crab #syn(ocean sea)'
  sift query -c run.toml --explain '#wand(0.8 #near/2(hermit crab) 0.2 shell.title)'")]
    Query(QueryCommand),

    /// Validate a configuration and show the resolved settings
    Check(CheckCommand),
}
