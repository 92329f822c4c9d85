//! Batch runs: every query of a query file against one index.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
    time::Instant,
};

use sift_config::Config;
use sift_index::{Analyzer, IndexAccessor, MemoryIndex};
use sift_query::{QueryLine, parse, parse_query_line};
use tracing::{debug, info};

use crate::{
    EvalError, Evaluator, ScoreList,
    feedback::{FeedbackDocument, InitialRanking, QueryExpander, format_expansion},
    trec::format_ranking,
};

/// Result of one query of a batch.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Query id.
    pub id: String,
    /// Ranked and truncated results.
    pub ranking: ScoreList,
    /// Expansion written to the expansion file, when feedback is enabled.
    pub expansion: Option<String>,
}

/// Summary of a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of queries evaluated.
    pub queries: usize,
    /// Trec results file.
    pub output: PathBuf,
}

/// Reads a query file. Blank lines are skipped.
pub fn read_queries(path: &Path) -> Result<Vec<QueryLine>, EvalError> {
    let text = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_query_line(line).map_err(EvalError::from))
        .collect()
}

/// Builds the analyzer named by the configuration and loads the corpus with it.
pub fn load_index(config: &Config) -> Result<(MemoryIndex, Analyzer), EvalError> {
    let start = Instant::now();
    let mut analyzer = Analyzer::new(&config.index.stemmer)?;
    let index = MemoryIndex::load(&config.index.path, &mut analyzer)?;
    info!(
        path = %config.index.path.display(),
        documents = index.num_docs()?,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index loaded"
    );
    Ok((index, analyzer))
}

/// Evaluates queries against one index with the settings of a configuration.
pub struct Batch<'a> {
    /// Shared read-only index.
    index: &'a dyn IndexAccessor,
    /// Run configuration.
    config: &'a Config,
    /// Initial ranking for feedback, when one is configured.
    initial_ranking: Option<InitialRanking>,
}

impl<'a> Batch<'a> {
    /// Prepares a batch, loading the initial feedback ranking if the configuration names one.
    pub fn new(index: &'a dyn IndexAccessor, config: &'a Config) -> Result<Self, EvalError> {
        let initial_ranking = match &config.feedback {
            Some(feedback) => match &feedback.initial_ranking {
                Some(path) => Some(InitialRanking::load(path, index, feedback.docs)?),
                None => None,
            },
            None => None,
        };
        Ok(Self {
            index,
            config,
            initial_ranking,
        })
    }

    /// Parses, optionally expands, evaluates and ranks one query.
    pub fn run_query(&self, query: &QueryLine, analyzer: &mut Analyzer) -> Result<QueryOutcome, EvalError> {
        let start = Instant::now();
        let model = self.config.model;
        let evaluator = Evaluator::new(self.index, model);

        let Some(original) = parse(&query.text, &model, analyzer)? else {
            debug!(query = %query.id, "query has no terms after analysis");
            return Ok(QueryOutcome {
                id: query.id.clone(),
                ranking: ScoreList::new(),
                expansion: None,
            });
        };

        let (tree, expansion) = match &self.config.feedback {
            Some(feedback) => {
                let documents = match &self.initial_ranking {
                    Some(ranking) => ranking.documents(&query.id).to_vec(),
                    None => {
                        let initial = evaluator
                            .evaluate(&original)?
                            .into_ranking(&model, self.index, feedback.docs)?;
                        FeedbackDocument::top(&initial, feedback.docs)
                    }
                };
                let expander = QueryExpander::new(self.index, feedback);
                let terms = expander.expansion_terms(&documents)?;
                let text = format_expansion(&terms);
                (expander.expand(original, &terms), Some(text))
            }
            None => (original, None),
        };

        let ranking = evaluator
            .evaluate(&tree)?
            .into_ranking(&model, self.index, self.config.run.limit)?;
        debug!(
            query = %query.id,
            matches = ranking.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "query evaluated"
        );
        Ok(QueryOutcome {
            id: query.id.clone(),
            ranking,
            expansion,
        })
    }

    /// Runs `queries` on the configured number of worker threads. Outcomes keep input order.
    pub fn run_all(&self, queries: &[QueryLine], analyzer: &Analyzer) -> Result<Vec<QueryOutcome>, EvalError> {
        let threads = self.config.run.threads.max(1);
        if threads == 1 || queries.len() < 2 {
            let mut analyzer = analyzer.clone();
            return queries
                .iter()
                .map(|q| self.run_query(q, &mut analyzer).map_err(|e| e.in_query(&q.id)))
                .collect();
        }

        let chunk_size = queries.len().div_ceil(threads);
        let chunks: Vec<Result<Vec<QueryOutcome>, EvalError>> = thread::scope(|scope| {
            let handles: Vec<_> = queries
                .chunks(chunk_size)
                .map(|chunk| {
                    let mut analyzer = analyzer.clone();
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|q| self.run_query(q, &mut analyzer).map_err(|e| e.in_query(&q.id)))
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(EvalError::WorkerPanicked)))
                .collect()
        });

        let mut outcomes = Vec::with_capacity(queries.len());
        for chunk in chunks {
            outcomes.extend(chunk?);
        }
        Ok(outcomes)
    }

    /// Writes trec results for `outcomes` to `path`.
    pub fn write_results(&self, path: &Path, outcomes: &mut [QueryOutcome]) -> Result<(), EvalError> {
        let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
        let mut out = BufWriter::new(file);
        for outcome in outcomes {
            let text = format_ranking(
                &outcome.id,
                &mut outcome.ranking,
                self.index,
                &self.config.run.run_id,
            )?;
            out.write_all(text.as_bytes())
                .map_err(|e| EvalError::io(path, e))?;
        }
        out.flush().map_err(|e| EvalError::io(path, e))
    }

    /// Writes one `id: expansion` line per expanded query to `path`.
    pub fn write_expansions(path: &Path, outcomes: &[QueryOutcome]) -> Result<(), EvalError> {
        let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
        let mut out = BufWriter::new(file);
        for outcome in outcomes {
            if let Some(expansion) = &outcome.expansion {
                writeln!(out, "{}: {expansion}", outcome.id).map_err(|e| EvalError::io(path, e))?;
            }
        }
        out.flush().map_err(|e| EvalError::io(path, e))
    }
}

/// Runs the batch a configuration describes: loads the corpus, evaluates every query and writes
/// the results file (and the expansion file when feedback is enabled).
pub fn run(config: &Config) -> Result<RunSummary, EvalError> {
    let start = Instant::now();
    let (index, analyzer) = load_index(config)?;
    let queries = read_queries(&config.run.queries)?;
    info!(queries = queries.len(), model = %config.model, "running queries");

    let batch = Batch::new(&index, config)?;
    let mut outcomes = batch.run_all(&queries, &analyzer)?;
    batch.write_results(&config.run.output, &mut outcomes)?;
    if let Some(feedback) = &config.feedback {
        Batch::write_expansions(&feedback.expansion_output, &outcomes)?;
    }

    info!(
        queries = outcomes.len(),
        output = %config.run.output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "run finished"
    );
    Ok(RunSummary {
        queries: outcomes.len(),
        output: config.run.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use sift_config::{FeedbackSettings, IndexSettings, RetrievalModel, RunSettings};
    use tempfile::TempDir;

    use super::*;

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        builder.add_tokens("d0", &[("body", "crab ocean crab")]).unwrap();
        builder.add_tokens("d1", &[("body", "ocean shell")]).unwrap();
        builder.add_tokens("d2", &[("body", "rust shell")]).unwrap();
        builder.build()
    }

    fn config(dir: &Path, model: RetrievalModel, threads: usize) -> Config {
        Config {
            index: IndexSettings {
                path: dir.join("corpus.json"),
                stemmer: "english".to_string(),
            },
            model,
            run: RunSettings {
                queries: dir.join("queries.txt"),
                output: dir.join("results.teIn"),
                limit: 100,
                run_id: "test".to_string(),
                threads,
            },
            feedback: None,
        }
    }

    fn line(id: &str, text: &str) -> QueryLine {
        QueryLine {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn read_queries_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.txt");
        fs::write(&path, "1: crab\n\n  \n2:#and(ocean shell)\n").unwrap();
        let queries = read_queries(&path).unwrap();
        assert_eq!(queries, vec![line("1", "crab"), line("2", "#and(ocean shell)")]);
    }

    #[test]
    fn read_queries_rejects_missing_colon() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.txt");
        fs::write(&path, "1 crab\n").unwrap();
        assert!(matches!(read_queries(&path), Err(EvalError::Query(_))));
    }

    #[test]
    fn threaded_run_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let index = index();
        let analyzer = Analyzer::new("english").unwrap();
        let queries: Vec<QueryLine> = ["crab", "ocean", "shell", "rust", "crab shell"]
            .iter()
            .enumerate()
            .map(|(i, q)| line(&i.to_string(), q))
            .collect();

        let sequential_config = config(dir.path(), RetrievalModel::RankedBoolean, 1);
        let sequential = Batch::new(&index, &sequential_config)
            .unwrap()
            .run_all(&queries, &analyzer)
            .unwrap();
        let threaded_config = config(dir.path(), RetrievalModel::RankedBoolean, 3);
        let threaded = Batch::new(&index, &threaded_config)
            .unwrap()
            .run_all(&queries, &analyzer)
            .unwrap();

        assert_eq!(
            sequential.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["0", "1", "2", "3", "4"]
        );
        for (a, b) in sequential.iter().zip(&threaded) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.ranking, b.ranking);
        }
    }

    #[test]
    fn query_errors_name_the_query() {
        let dir = TempDir::new().unwrap();
        let index = index();
        let analyzer = Analyzer::new("english").unwrap();
        let config = config(dir.path(), RetrievalModel::RankedBoolean, 1);
        let batch = Batch::new(&index, &config).unwrap();
        let err = batch
            .run_all(&[line("42", "#and(crab")], &analyzer)
            .unwrap_err();
        assert!(err.to_string().starts_with("query 42:"));
    }

    #[test]
    fn writes_results_and_expansions() {
        let dir = TempDir::new().unwrap();
        let index = index();
        let mut analyzer = Analyzer::new("english").unwrap();
        let mut config = config(dir.path(), RetrievalModel::indri(10.0, 0.5).unwrap(), 1);
        config.feedback = Some(FeedbackSettings {
            docs: 1,
            terms: 2,
            mu: 0.0,
            orig_weight: 0.5,
            initial_ranking: None,
            expansion_output: dir.path().join("expansion.txt"),
        });

        let batch = Batch::new(&index, &config).unwrap();
        let mut outcomes = vec![batch.run_query(&line("1", "crab"), &mut analyzer).unwrap()];
        batch.write_results(&config.run.output, &mut outcomes).unwrap();
        Batch::write_expansions(&dir.path().join("expansion.txt"), &outcomes).unwrap();

        let results = fs::read_to_string(&config.run.output).unwrap();
        assert!(results.starts_with("1 Q0 d0 1 "));
        assert!(results.lines().all(|l| l.ends_with(" test")));

        let expansion = fs::read_to_string(dir.path().join("expansion.txt")).unwrap();
        assert!(expansion.starts_with("1: #wand( "));
        assert!(expansion.contains(" crab "));
        assert!(expansion.ends_with(")\n"));
    }

    #[test]
    fn stopword_only_query_has_no_results() {
        let dir = TempDir::new().unwrap();
        let index = index();
        let mut analyzer = Analyzer::new("english").unwrap();
        let config = config(dir.path(), RetrievalModel::RankedBoolean, 1);
        let batch = Batch::new(&index, &config).unwrap();
        let outcome = batch.run_query(&line("5", "the"), &mut analyzer).unwrap();
        assert!(outcome.ranking.is_empty());
    }
}
