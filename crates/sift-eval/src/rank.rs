//! Turning evaluation results into rankings.

use std::cmp::Ordering;

use sift_config::RetrievalModel;
use sift_index::IndexAccessor;

use crate::{EvalError, EvaluationResult, ScoreList, scoring::score_list};

impl EvaluationResult {
    /// Ranks the result by descending score, breaking ties by ascending external id, and keeps
    /// at most `limit` documents.
    ///
    /// A bare inverted list is scored with `model` first. External ids are only looked up for
    /// documents whose score ties with another's inside the kept range.
    pub fn into_ranking(
        self,
        model: &RetrievalModel,
        index: &dyn IndexAccessor,
        limit: usize,
    ) -> Result<ScoreList, EvalError> {
        let scores = match self {
            Self::Scores(scores) => scores,
            Self::List(list) => score_list(model, index, &list)?.0,
        };
        rank(scores, index, limit)
    }
}

/// Sorts `scores` into rank order and truncates it to `limit` entries.
pub fn rank(mut scores: ScoreList, index: &dyn IndexAccessor, limit: usize) -> Result<ScoreList, EvalError> {
    let entries = scores.entries_mut();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.docid.cmp(&b.docid)));

    let mut start = 0;
    while start < entries.len().min(limit) {
        let score = entries[start].score;
        let run = entries[start..]
            .iter()
            .take_while(|e| e.score.total_cmp(&score) == Ordering::Equal)
            .count();
        let tied = &mut entries[start..start + run];
        if tied.len() > 1 {
            for entry in tied.iter_mut() {
                entry.external_id(index)?;
            }
            tied.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        }
        start += run;
    }

    scores.truncate(limit);
    Ok(scores)
}
