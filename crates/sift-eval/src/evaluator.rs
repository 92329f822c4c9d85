//! Document-at-a-time evaluation of operator trees.
//!
//! List operators are evaluated into inverted lists and score operators into score lists. A list
//! argument of a score operator is scored on the spot, as if wrapped in `#score`. Score
//! operators merge their arguments one document at a time; under Indri a document missing from
//! an argument takes that argument's default score.

use sift_config::{Bm25Params, ModelFamily, RetrievalModel};
use sift_index::{DEFAULT_FIELD, DocId, IndexAccessor, InvertedList};
use sift_query::QueryNode;
use tracing::trace;

use crate::{
    DefaultScore, EvalError, EvaluationResult, ScoreEntry, ScoreList,
    cursor::{DaatCursor, min_docid},
    proximity,
    scoring::score_list,
};

/// Scores of one evaluated score operator together with its default score.
#[derive(Debug)]
struct Scored {
    /// Matching documents.
    scores: ScoreList,
    /// Score of documents not in `scores`.
    default: DefaultScore,
}

/// Evaluates query trees against an index under one retrieval model.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    /// Source of postings and statistics.
    index: &'a dyn IndexAccessor,
    /// Model used for leaf scores and operator semantics.
    model: RetrievalModel,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    pub fn new(index: &'a dyn IndexAccessor, model: RetrievalModel) -> Self {
        Self { index, model }
    }

    /// The retrieval model.
    pub fn model(&self) -> &RetrievalModel {
        &self.model
    }

    /// The index queries are evaluated against.
    pub fn index(&self) -> &'a dyn IndexAccessor {
        self.index
    }

    /// Evaluates `node`: an inverted list for a list operator, scores otherwise.
    pub fn evaluate(&self, node: &QueryNode) -> Result<EvaluationResult, EvalError> {
        if node.is_list_operator() {
            Ok(EvaluationResult::List(self.evaluate_list(node)?))
        } else {
            Ok(EvaluationResult::Scores(self.evaluate_scored(node)?.scores))
        }
    }

    /// Evaluates a list operator.
    fn evaluate_list(&self, node: &QueryNode) -> Result<InvertedList, EvalError> {
        match node {
            QueryNode::Term { text, field } => Ok(self.index.postings(text, field)?),
            QueryNode::Syn(children) => {
                let (field, lists) = self.list_arguments(node, children)?;
                Ok(proximity::syn(&field, &lists))
            }
            QueryNode::Near { distance, children } => {
                let (field, lists) = self.list_arguments(node, children)?;
                Ok(proximity::near(&field, &lists, *distance))
            }
            QueryNode::Window { width, children } => {
                let (field, lists) = self.list_arguments(node, children)?;
                Ok(proximity::window(&field, &lists, *width))
            }
            _ => Err(EvalError::InvalidArgument {
                operator: node.name(),
            }),
        }
    }

    /// Evaluates the arguments of a list operator, which must all search one field.
    fn list_arguments(
        &self,
        parent: &QueryNode,
        children: &[QueryNode],
    ) -> Result<(String, Vec<InvertedList>), EvalError> {
        let mut lists: Vec<InvertedList> = Vec::with_capacity(children.len());
        for child in children {
            if !child.is_list_operator() {
                return Err(EvalError::InvalidArgument {
                    operator: parent.name(),
                });
            }
            let list = self.evaluate_list(child)?;
            if let Some(first) = lists.first()
                && first.field() != list.field()
            {
                return Err(EvalError::FieldMismatch {
                    operator: parent.name(),
                    expected: first.field().to_string(),
                    found: list.field().to_string(),
                });
            }
            lists.push(list);
        }
        let field = parent
            .field()
            .or_else(|| lists.first().map(InvertedList::field))
            .unwrap_or(DEFAULT_FIELD)
            .to_string();
        Ok((field, lists))
    }

    /// Evaluates any node to scores, scoring list operators with the model.
    fn evaluate_scored(&self, node: &QueryNode) -> Result<Scored, EvalError> {
        self.check_supported(node)?;
        let scored = match node {
            QueryNode::Score(child) => self.score(child)?,
            QueryNode::And(children) => match self.model.family() {
                ModelFamily::Indri => {
                    let weights = vec![1.0; children.len()];
                    self.weighted_and(&self.arguments(children)?, &weights)?
                }
                _ => Self::boolean_and(self.arguments(children)?),
            },
            QueryNode::Or(children) => Self::boolean_or(&self.arguments(children)?)?,
            QueryNode::Sum(children) => self.sum(&self.arguments(children)?)?,
            QueryNode::WeightedAnd { children, weights } => {
                check_weights(node, children, weights)?;
                self.weighted_and(&self.arguments(children)?, weights)?
            }
            QueryNode::WeightedSum { children, weights } => {
                check_weights(node, children, weights)?;
                self.weighted_sum(&self.arguments(children)?, weights)?
            }
            QueryNode::Term { .. }
            | QueryNode::Syn(_)
            | QueryNode::Near { .. }
            | QueryNode::Window { .. } => self.score(node)?,
        };
        trace!(operator = %node.name(), matches = scored.scores.len(), "evaluated");
        Ok(scored)
    }

    /// Rejects operators the model gives no meaning to.
    fn check_supported(&self, node: &QueryNode) -> Result<(), EvalError> {
        let family = self.model.family();
        let supported = match node {
            QueryNode::And(_) => family != ModelFamily::Bm25,
            QueryNode::Or(_) => family == ModelFamily::Boolean,
            QueryNode::Sum(_) => family == ModelFamily::Bm25,
            QueryNode::WeightedAnd { .. } | QueryNode::WeightedSum { .. } => {
                family == ModelFamily::Indri
            }
            _ => true,
        };
        if supported {
            Ok(())
        } else {
            Err(EvalError::UnsupportedOperator {
                operator: node.name(),
                model: self.model.name(),
            })
        }
    }

    /// Scores a list operator with the model.
    fn score(&self, node: &QueryNode) -> Result<Scored, EvalError> {
        let list = self.evaluate_list(node)?;
        let (scores, default) = score_list(&self.model, self.index, &list)?;
        Ok(Scored { scores, default })
    }

    /// Evaluates every argument of a score operator.
    fn arguments(&self, children: &[QueryNode]) -> Result<Vec<Scored>, EvalError> {
        children.iter().map(|c| self.evaluate_scored(c)).collect()
    }

    /// Boolean conjunction: documents in every argument, scored by their smallest score.
    fn boolean_and(mut args: Vec<Scored>) -> Scored {
        let mut scores = ScoreList::new();
        args.sort_by_key(|a| a.scores.len());
        if let Some((shortest, rest)) = args.split_first() {
            let mut cursors: Vec<DaatCursor<'_, ScoreEntry>> = rest
                .iter()
                .map(|a| DaatCursor::new(a.scores.entries()))
                .collect();
            'docs: for entry in shortest.scores.entries() {
                let mut min = entry.score;
                for cursor in &mut cursors {
                    let Some(other) = cursor.skip_to(entry.docid) else {
                        continue 'docs;
                    };
                    min = min.min(other.score);
                }
                scores.push(entry.docid, min);
            }
        }
        Scored {
            scores,
            default: DefaultScore::Zero,
        }
    }

    /// Boolean disjunction: documents in any argument, scored by their largest score.
    fn boolean_or(args: &[Scored]) -> Result<Scored, EvalError> {
        let scores = merge_union(args, |_, present| {
            Ok(present
                .iter()
                .flatten()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max))
        })?;
        Ok(Scored {
            scores,
            default: DefaultScore::Zero,
        })
    }

    /// BM25 sum of the arguments' scores, each weighted by the query term weight.
    fn sum(&self, args: &[Scored]) -> Result<Scored, EvalError> {
        let qtw = self.model.bm25_params().map_or(1.0, Bm25Params::query_term_weight);
        let scores = merge_union(args, |_, present| {
            Ok(present.iter().flatten().map(|s| s * qtw).sum())
        })?;
        Ok(Scored {
            scores,
            default: DefaultScore::Zero,
        })
    }

    /// Indri weighted product. A missing argument contributes its default score.
    fn weighted_and(&self, args: &[Scored], weights: &[f64]) -> Result<Scored, EvalError> {
        let total: f64 = weights.iter().sum();
        let exponents: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let scores = merge_union(args, |docid, present| {
            let mut product = 1.0;
            for ((arg, score), exponent) in args.iter().zip(present).zip(&exponents) {
                let score = match score {
                    Some(score) => *score,
                    None => arg.default.compute(self.index, docid)?,
                };
                product *= score.powf(*exponent);
            }
            Ok(product)
        })?;
        let default = DefaultScore::Product(
            args.iter()
                .zip(exponents)
                .map(|(arg, e)| (arg.default.clone(), e))
                .collect(),
        );
        Ok(Scored { scores, default })
    }

    /// Indri weighted sum. A score of exactly zero contributes nothing.
    fn weighted_sum(&self, args: &[Scored], weights: &[f64]) -> Result<Scored, EvalError> {
        let total: f64 = weights.iter().sum();
        let normalized: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let scores = merge_union(args, |docid, present| {
            let mut sum = 0.0;
            for ((arg, score), weight) in args.iter().zip(present).zip(&normalized) {
                let score = match score {
                    Some(score) => *score,
                    None => arg.default.compute(self.index, docid)?,
                };
                if score == 0.0 {
                    continue;
                }
                sum += weight * score;
            }
            Ok(sum)
        })?;
        let default = DefaultScore::Mixture(
            args.iter()
                .zip(normalized)
                .map(|(arg, w)| (arg.default.clone(), w))
                .collect(),
        );
        Ok(Scored { scores, default })
    }
}

/// Checks that a weighted operator has one weight per argument and a positive weight total.
fn check_weights(node: &QueryNode, children: &[QueryNode], weights: &[f64]) -> Result<(), EvalError> {
    if children.len() != weights.len() {
        return Err(EvalError::WeightMismatch {
            operator: node.name(),
            children: children.len(),
            weights: weights.len(),
        });
    }
    let total: f64 = weights.iter().sum();
    if !children.is_empty() && !(total > 0.0 && total.is_finite()) {
        return Err(EvalError::InvalidWeights {
            operator: node.name(),
        });
    }
    Ok(())
}

/// Visits every document in any argument in docid order, calling `combine` with the document
/// and each argument's score for it (`None` where the argument lacks the document).
fn merge_union<F>(args: &[Scored], mut combine: F) -> Result<ScoreList, EvalError>
where
    F: FnMut(DocId, &[Option<f64>]) -> Result<f64, EvalError>,
{
    let mut cursors: Vec<DaatCursor<'_, ScoreEntry>> = args
        .iter()
        .map(|a| DaatCursor::new(a.scores.entries()))
        .collect();
    let mut present = vec![None; cursors.len()];
    let mut scores = ScoreList::new();

    while let Some(docid) = min_docid(&cursors) {
        for (slot, cursor) in present.iter_mut().zip(&mut cursors) {
            *slot = cursor.take(docid).map(|e| e.score);
        }
        scores.push(docid, combine(docid, &present)?);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use sift_config::IndriParams;
    use sift_index::MemoryIndex;
    use sift_query::parse;

    use super::*;

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        builder.add_tokens("d0", &[("body", "crab ocean crab"), ("title", "crab")]).unwrap();
        builder.add_tokens("d1", &[("body", "ocean shell")]).unwrap();
        builder.add_tokens("d2", &[("body", "crab shell ocean ocean")]).unwrap();
        builder.add_tokens("d3", &[("body", "rust")]).unwrap();
        builder.build()
    }

    fn identity(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    fn run(index: &MemoryIndex, model: RetrievalModel, query: &str) -> ScoreList {
        let node = parse(query, &model, &mut identity).unwrap().unwrap();
        match Evaluator::new(index, model).evaluate(&node).unwrap() {
            EvaluationResult::Scores(scores) => scores,
            EvaluationResult::List(_) => panic!("expected scores"),
        }
    }

    fn pairs(scores: &ScoreList) -> Vec<(DocId, f64)> {
        scores.entries().iter().map(|e| (e.docid, e.score)).collect()
    }

    #[test]
    fn unranked_and_or() {
        let index = index();
        let model = RetrievalModel::UnrankedBoolean;
        assert_eq!(
            pairs(&run(&index, model, "#and(crab ocean)")),
            vec![(0, 1.0), (2, 1.0)]
        );
        assert_eq!(
            pairs(&run(&index, model, "crab shell")),
            vec![(0, 1.0), (1, 1.0), (2, 1.0)]
        );
    }

    #[test]
    fn ranked_and_takes_min_or_takes_max() {
        let index = index();
        let model = RetrievalModel::RankedBoolean;
        assert_eq!(
            pairs(&run(&index, model, "#and(crab ocean)")),
            vec![(0, 1.0), (2, 1.0)]
        );
        assert_eq!(
            pairs(&run(&index, model, "#or(crab ocean)")),
            vec![(0, 2.0), (1, 1.0), (2, 2.0)]
        );
    }

    #[test]
    fn field_terms() {
        let index = index();
        let scores = run(&index, RetrievalModel::RankedBoolean, "crab.title");
        assert_eq!(pairs(&scores), vec![(0, 1.0)]);
    }

    #[test]
    fn unsupported_operators_fail() {
        let index = index();
        let bm25 = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();
        let node = QueryNode::And(vec![QueryNode::term("crab")]);
        let err = Evaluator::new(&index, bm25).evaluate(&node).unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedOperator { .. }));

        let node = QueryNode::WeightedSum {
            children: vec![QueryNode::term("crab")],
            weights: vec![1.0],
        };
        let err = Evaluator::new(&index, RetrievalModel::RankedBoolean)
            .evaluate(&node)
            .unwrap_err();
        assert!(err.to_string().contains("#wsum"));
    }

    #[test]
    fn weight_checks() {
        let index = index();
        let indri = RetrievalModel::indri(10.0, 0.5).unwrap();
        let evaluator = Evaluator::new(&index, indri);
        let node = QueryNode::WeightedAnd {
            children: vec![QueryNode::term("crab"), QueryNode::term("ocean")],
            weights: vec![1.0],
        };
        assert!(matches!(
            evaluator.evaluate(&node),
            Err(EvalError::WeightMismatch { children: 2, weights: 1, .. })
        ));

        let node = QueryNode::WeightedAnd {
            children: vec![QueryNode::term("crab")],
            weights: vec![0.0],
        };
        assert!(matches!(
            evaluator.evaluate(&node),
            Err(EvalError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn list_operator_rejects_score_arguments() {
        let index = index();
        let node = QueryNode::Syn(vec![QueryNode::Or(vec![QueryNode::term("crab")])]);
        let err = Evaluator::new(&index, RetrievalModel::RankedBoolean)
            .evaluate(&node)
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument { .. }));
    }

    #[test]
    fn list_operator_rejects_mixed_fields() {
        let index = index();
        let node = QueryNode::Near {
            distance: 1,
            children: vec![QueryNode::term("crab"), QueryNode::term_in("crab", "title")],
        };
        let err = Evaluator::new(&index, RetrievalModel::RankedBoolean)
            .evaluate(&node)
            .unwrap_err();
        assert!(matches!(err, EvalError::FieldMismatch { .. }));
    }

    #[test]
    fn list_root_returns_postings() {
        let index = index();
        let node = QueryNode::Near {
            distance: 1,
            children: vec![QueryNode::term("crab"), QueryNode::term("ocean")],
        };
        let result = Evaluator::new(&index, RetrievalModel::RankedBoolean)
            .evaluate(&node)
            .unwrap();
        let EvaluationResult::List(list) = result else {
            panic!("expected postings");
        };
        assert_eq!(list.postings().len(), 1);
        assert_eq!(list.postings()[0].docid, 0);
        assert_eq!(list.postings()[0].positions, vec![1]);
    }

    #[test]
    fn indri_and_uses_defaults_for_missing_terms() {
        let index = index();
        let params = IndriParams::new(10.0, 0.5).unwrap();
        let model = RetrievalModel::Indri(params);
        let scores = run(&index, model, "crab shell");

        // Body: 10 tokens; crab ctf 3, shell ctf 2. Lengths 3, 2, 4, 1.
        let p_crab = 3.0 / 10.0;
        let p_shell = 2.0 / 10.0;
        let d0 = (params.smoothed(2.0, 3.0, p_crab) * params.smoothed(0.0, 3.0, p_shell)).sqrt();
        let d1 = (params.smoothed(0.0, 2.0, p_crab) * params.smoothed(1.0, 2.0, p_shell)).sqrt();
        let d2 = (params.smoothed(1.0, 4.0, p_crab) * params.smoothed(1.0, 4.0, p_shell)).sqrt();

        let got = pairs(&scores);
        assert_eq!(got.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![0, 1, 2]);
        for ((_, score), expected) in got.iter().zip([d0, d1, d2]) {
            assert!((score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn uniform_wand_equals_and() {
        let index = index();
        let model = RetrievalModel::indri(10.0, 0.5).unwrap();
        let and = run(&index, model, "#and(crab #and(ocean shell))");
        let wand = run(&index, model, "#wand(2 crab 2 #wand(0.5 ocean 0.5 shell))");
        for (a, w) in and.entries().iter().zip(wand.entries()) {
            assert_eq!(a.docid, w.docid);
            assert!((a.score - w.score).abs() < 1e-12);
        }
        assert_eq!(and.len(), wand.len());
    }

    #[test]
    fn nested_default_scores() {
        let index = index();
        let params = IndriParams::new(10.0, 0.5).unwrap();
        let model = RetrievalModel::Indri(params);
        // d3 matches only "rust"; the inner #and contributes its nested default.
        let scores = run(&index, model, "#and(rust #and(crab shell))");

        let p_rust = 1.0 / 10.0;
        let p_crab = 3.0 / 10.0;
        let p_shell = 2.0 / 10.0;
        let inner_default =
            (params.smoothed(0.0, 1.0, p_crab) * params.smoothed(0.0, 1.0, p_shell)).sqrt();
        let expected = (params.smoothed(1.0, 1.0, p_rust) * inner_default).sqrt();
        let d3 = scores.score_of(3).unwrap();
        assert!((d3 - expected).abs() < 1e-12);
    }

    #[test]
    fn wsum_mixes_scores() {
        let index = index();
        let params = IndriParams::new(10.0, 0.5).unwrap();
        let model = RetrievalModel::Indri(params);
        let scores = run(&index, model, "#wsum(3 crab 1 rust)");

        let expected = 0.75 * params.smoothed(0.0, 1.0, 0.3) + 0.25 * params.smoothed(1.0, 1.0, 0.1);
        assert!((scores.score_of(3).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn bm25_sum_adds_term_scores() {
        let index = index();
        let model = RetrievalModel::bm25(1.2, 0.75, 5.0).unwrap();
        let scores = run(&index, model, "crab shell");

        let term = |text: &str| {
            let list = index.postings(text, DEFAULT_FIELD).unwrap();
            score_list(&model, &index, &list).unwrap().0
        };
        let (crab, shell) = (term("crab"), term("shell"));
        let expected = crab.score_of(2).unwrap() + shell.score_of(2).unwrap();

        assert_eq!(scores.entries().iter().map(|e| e.docid).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!((scores.score_of(0).unwrap() - crab.score_of(0).unwrap()).abs() < 1e-12);
        assert!((scores.score_of(1).unwrap() - shell.score_of(1).unwrap()).abs() < 1e-12);
        assert!((scores.score_of(2).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn syn_scores_like_merged_list() {
        let index = index();
        let model = RetrievalModel::RankedBoolean;
        let scores = run(&index, model, "#syn(crab shell)");
        assert_eq!(pairs(&scores), vec![(0, 2.0), (1, 1.0), (2, 2.0)]);
    }

    #[test]
    fn empty_arguments_yield_nothing() {
        let index = index();
        let evaluator = Evaluator::new(&index, RetrievalModel::RankedBoolean);
        let result = evaluator.evaluate(&QueryNode::Or(Vec::new())).unwrap();
        assert!(result.is_empty());
        let result = evaluator.evaluate(&QueryNode::And(Vec::new())).unwrap();
        assert!(result.is_empty());
    }
}
