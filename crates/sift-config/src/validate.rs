//! Configuration validation.
//!
//! Turns a [`RawConfig`] into a fully resolved [`Config`], checking that every required key is
//! present and every parameter is in range. The first problem found is returned as an error.

use std::path::Path;

use crate::{
    Algorithm, Config, ConfigError, FeedbackSettings, IndexSettings, RetrievalModel, RunSettings,
    parse::{RawConfig, RawFeedback, RawIndex, RawModel, RawRun},
    resolve::resolve_path,
};

/// Default maximum number of result lines per query.
pub const DEFAULT_RESULT_LIMIT: usize = 100;

/// Default run identifier.
pub const DEFAULT_RUN_ID: &str = "Run";

/// Default stemmer language.
pub const DEFAULT_STEMMER: &str = "english";

/// Resolves and validates a raw configuration.
///
/// Relative paths are resolved against `config_dir`.
pub fn resolve_config(raw: RawConfig, config_dir: &Path) -> Result<Config, ConfigError> {
    let index = resolve_index(raw.index.unwrap_or_default(), config_dir)?;
    let model = resolve_model(&raw.model.unwrap_or_default())?;
    let run = resolve_run(raw.run.unwrap_or_default(), config_dir)?;
    let feedback = match raw.feedback {
        Some(feedback) => resolve_feedback(feedback, &model, config_dir)?,
        None => None,
    };

    Ok(Config {
        index,
        model,
        run,
        feedback,
    })
}

/// Resolves the `[model]` section into a retrieval model.
pub fn resolve_model(raw: &RawModel) -> Result<RetrievalModel, ConfigError> {
    let name = raw
        .algorithm
        .as_deref()
        .ok_or_else(|| ConfigError::missing("model.algorithm"))?;

    match name.parse::<Algorithm>()? {
        Algorithm::UnrankedBoolean => Ok(RetrievalModel::UnrankedBoolean),
        Algorithm::RankedBoolean => Ok(RetrievalModel::RankedBoolean),
        Algorithm::Bm25 => RetrievalModel::bm25(
            required(raw.k1, "model.k1")?,
            required(raw.b, "model.b")?,
            required(raw.k3, "model.k3")?,
        ),
        Algorithm::Indri => RetrievalModel::indri(
            required(raw.mu, "model.mu")?,
            required(raw.lambda, "model.lambda")?,
        ),
    }
}

/// Resolves the `[index]` section.
fn resolve_index(raw: RawIndex, config_dir: &Path) -> Result<IndexSettings, ConfigError> {
    let path = raw.path.ok_or_else(|| ConfigError::missing("index.path"))?;
    Ok(IndexSettings {
        path: resolve_path(&path, config_dir)?,
        stemmer: raw.stemmer.unwrap_or_else(|| DEFAULT_STEMMER.to_string()),
    })
}

/// Resolves the `[run]` section.
fn resolve_run(raw: RawRun, config_dir: &Path) -> Result<RunSettings, ConfigError> {
    let queries = raw.queries.ok_or_else(|| ConfigError::missing("run.queries"))?;
    let output = raw.output.ok_or_else(|| ConfigError::missing("run.output"))?;

    let limit = raw.limit.unwrap_or(DEFAULT_RESULT_LIMIT);
    if limit == 0 {
        return Err(ConfigError::invalid("run.limit", limit, "must be > 0"));
    }

    let threads = raw.threads.unwrap_or(1);
    if threads == 0 {
        return Err(ConfigError::invalid("run.threads", threads, "must be > 0"));
    }

    Ok(RunSettings {
        queries: resolve_path(&queries, config_dir)?,
        output: resolve_path(&output, config_dir)?,
        limit,
        run_id: raw.run_id.unwrap_or_else(|| DEFAULT_RUN_ID.to_string()),
        threads,
    })
}

/// Resolves the `[feedback]` section. Returns `None` when feedback is disabled.
fn resolve_feedback(
    raw: RawFeedback,
    model: &RetrievalModel,
    config_dir: &Path,
) -> Result<Option<FeedbackSettings>, ConfigError> {
    if !raw.enabled.unwrap_or(true) {
        return Ok(None);
    }

    if model.indri_params().is_none() {
        return Err(ConfigError::FeedbackRequiresIndri { model: model.name() });
    }

    let docs = required(raw.docs, "feedback.docs")?;
    if docs == 0 {
        return Err(ConfigError::invalid("feedback.docs", docs, "must be > 0"));
    }

    let terms = required(raw.terms, "feedback.terms")?;
    if terms == 0 {
        return Err(ConfigError::invalid("feedback.terms", terms, "must be > 0"));
    }

    let mu = required(raw.mu, "feedback.mu")?;
    if !(mu >= 0.0) {
        return Err(ConfigError::invalid("feedback.mu", mu, "must be >= 0"));
    }

    let orig_weight = required(raw.orig_weight, "feedback.orig_weight")?;
    if !(0.0..=1.0).contains(&orig_weight) {
        return Err(ConfigError::invalid(
            "feedback.orig_weight",
            orig_weight,
            "must be between 0 and 1",
        ));
    }

    let expansion_output = required(raw.expansion_output, "feedback.expansion_output")?;
    let initial_ranking = raw
        .initial_ranking
        .filter(|p| !p.is_empty())
        .map(|p| resolve_path(&p, config_dir))
        .transpose()?;

    Ok(Some(FeedbackSettings {
        docs,
        terms,
        mu,
        orig_weight,
        initial_ranking,
        expansion_output: resolve_path(&expansion_output, config_dir)?,
    }))
}

/// Unwraps a required value or reports the missing key.
fn required<T>(value: Option<T>, key: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::missing(key))
}
