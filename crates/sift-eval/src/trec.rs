//! Trec-eval run file output.
//!
//! Each ranked document becomes one line: `qid Q0 external_id rank score run_id`. A query without
//! results still gets a single placeholder line so that every query appears in the run.

use sift_index::IndexAccessor;

use crate::{EvalError, ScoreList};

/// External id written for a query that matched nothing.
pub const EMPTY_RESULT_ID: &str = "dummy";

/// Run id written for a query that matched nothing.
pub const EMPTY_RESULT_RUN_ID: &str = "None";

/// Formats a ranked list in trec-eval format. `scores` must already be ranked and truncated.
pub fn format_ranking(
    query_id: &str,
    scores: &mut ScoreList,
    index: &dyn IndexAccessor,
    run_id: &str,
) -> Result<String, EvalError> {
    if scores.is_empty() {
        return Ok(format!(
            "{query_id} Q0 {EMPTY_RESULT_ID} 1 0 {EMPTY_RESULT_RUN_ID}\n"
        ));
    }

    let mut text = String::new();
    for (rank, entry) in scores.entries_mut().iter_mut().enumerate() {
        let score = format_score(entry.score);
        let external_id = entry.external_id(index)?;
        text.push_str(&format!(
            "{query_id} Q0 {external_id} {} {score} {run_id}\n",
            rank + 1
        ));
    }
    Ok(text)
}

/// Formats a score: integral values keep one decimal place, others print in full.
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        format!("{score}")
    }
}

#[cfg(test)]
mod tests {
    use sift_index::MemoryIndex;

    use super::*;

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        builder.add_tokens("GX000-01", &[("body", "crab")]).unwrap();
        builder.add_tokens("GX000-02", &[("body", "ocean")]).unwrap();
        builder.build()
    }

    #[test]
    fn formats_lines() {
        let index = index();
        let mut scores: ScoreList = [(1, 2.0), (0, 0.25)].into_iter().collect();
        let text = format_ranking("10", &mut scores, &index, "run-1").unwrap();
        assert_eq!(
            text,
            "10 Q0 GX000-02 1 2.0 run-1\n10 Q0 GX000-01 2 0.25 run-1\n"
        );
    }

    #[test]
    fn empty_result_gets_placeholder() {
        let index = index();
        let text = format_ranking("7", &mut ScoreList::new(), &index, "run-1").unwrap();
        assert_eq!(text, "7 Q0 dummy 1 0 None\n");
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(3.0), "3.0");
        assert_eq!(format_score(-0.5), "-0.5");
        assert_eq!(format_score(0.123_456_789), "0.123456789");
    }
}
