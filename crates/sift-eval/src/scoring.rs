//! Leaf scoring and default scores.
//!
//! The score operator turns an inverted list into a score list according to the retrieval model.
//! Under Indri every score-producing node also carries a [`DefaultScore`]: the score a document
//! receives when it is absent from that node's result.

use sift_config::{Bm25Params, IndriParams, RetrievalModel};
use sift_index::{DocId, IndexAccessor, InvertedList};

use crate::{EvalError, ScoreList};

/// Score given to a document missing from an argument's result.
///
/// Mirrors the shape of the operator tree so the default of a nested operator is the same
/// combination of its arguments' defaults that it applies to real scores.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultScore {
    /// Every model except Indri.
    Zero,
    /// Indri score of a list with term frequency zero.
    Smoothed {
        /// Smoothing parameters.
        params: IndriParams,
        /// Field whose document length is used.
        field: String,
        /// Collection probability of the list, `ctf / total_term_count`.
        p_collection: f64,
    },
    /// Product of argument defaults raised to their exponents.
    Product(Vec<(Self, f64)>),
    /// Weighted sum of argument defaults; an exact 0.0 contributes nothing.
    Mixture(Vec<(Self, f64)>),
}

impl DefaultScore {
    /// Computes the default score of `docid`.
    pub fn compute(&self, index: &dyn IndexAccessor, docid: DocId) -> Result<f64, EvalError> {
        match self {
            Self::Zero => Ok(0.0),
            Self::Smoothed {
                params,
                field,
                p_collection,
            } => {
                let doclen = index.doc_length(field, docid)? as f64;
                Ok(params.smoothed(0.0, doclen, *p_collection))
            }
            Self::Product(parts) => parts.iter().try_fold(1.0, |acc, (part, exponent)| {
                Ok(acc * part.compute(index, docid)?.powf(*exponent))
            }),
            Self::Mixture(parts) => parts.iter().try_fold(0.0, |acc, (part, weight)| {
                let score = part.compute(index, docid)?;
                Ok(if score == 0.0 { acc } else { acc + weight * score })
            }),
        }
    }
}

/// Scores every posting of `list` under `model`.
pub fn score_list(
    model: &RetrievalModel,
    index: &dyn IndexAccessor,
    list: &InvertedList,
) -> Result<(ScoreList, DefaultScore), EvalError> {
    match model {
        RetrievalModel::UnrankedBoolean => Ok((
            list.postings().iter().map(|p| (p.docid, 1.0)).collect(),
            DefaultScore::Zero,
        )),
        RetrievalModel::RankedBoolean => Ok((
            list.postings()
                .iter()
                .map(|p| (p.docid, f64::from(p.term_freq())))
                .collect(),
            DefaultScore::Zero,
        )),
        RetrievalModel::Bm25(params) => Ok((bm25(params, index, list)?, DefaultScore::Zero)),
        RetrievalModel::Indri(params) => indri(params, index, list),
    }
}

/// BM25 scores of a list.
fn bm25(params: &Bm25Params, index: &dyn IndexAccessor, list: &InvertedList) -> Result<ScoreList, EvalError> {
    if list.is_empty() {
        return Ok(ScoreList::new());
    }

    let field = list.field();
    let n = index.num_docs()? as f64;
    let df = list.doc_freq() as f64;
    let idf = ((n - df + 0.5) / (df + 0.5)).ln();
    let avg_doclen = index.total_term_count(field)? as f64 / index.doc_count(field)? as f64;

    let mut scores = ScoreList::new();
    for posting in list.postings() {
        let tf = f64::from(posting.term_freq());
        let doclen = index.doc_length(field, posting.docid)? as f64;
        let norm = (1.0 - params.b) + params.b * doclen / avg_doclen;
        let tf_weight = tf / (tf + params.k1 * norm);
        scores.push(posting.docid, idf * tf_weight);
    }
    Ok(scores)
}

/// Indri scores of a list together with its default score.
fn indri(
    params: &IndriParams,
    index: &dyn IndexAccessor,
    list: &InvertedList,
) -> Result<(ScoreList, DefaultScore), EvalError> {
    let field = list.field();
    let total = index.total_term_count(field)?;
    let p_collection = if total == 0 {
        0.0
    } else {
        list.collection_term_freq() as f64 / total as f64
    };

    let mut scores = ScoreList::new();
    for posting in list.postings() {
        let tf = f64::from(posting.term_freq());
        let doclen = index.doc_length(field, posting.docid)? as f64;
        scores.push(posting.docid, params.smoothed(tf, doclen, p_collection));
    }

    let default = DefaultScore::Smoothed {
        params: *params,
        field: field.to_string(),
        p_collection,
    };
    Ok((scores, default))
}
