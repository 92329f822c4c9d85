//! End-to-end evaluation tests: query text in, ranked scores out.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{collections::BTreeSet, iter};

use proptest::prelude::*;
use sift_config::RetrievalModel;
use sift_eval::{EvaluationResult, Evaluator, ScoreList, score_list, syn};
use sift_index::{DocId, IndexAccessor, MemoryIndex};
use sift_query::parse;

/// Analyzer that keeps query terms unchanged.
fn identity(text: &str) -> Vec<String> {
    vec![text.to_string()]
}

/// Builds an index of body-only documents named `d0`, `d1`, ...
fn index_of(bodies: &[&str]) -> MemoryIndex {
    let mut builder = MemoryIndex::builder();
    for (i, body) in bodies.iter().enumerate() {
        builder.add_tokens(&format!("d{i}"), &[("body", *body)]).unwrap();
    }
    builder.build()
}

/// Parses and evaluates `query`, returning its scores.
fn scores(index: &MemoryIndex, model: RetrievalModel, query: &str) -> ScoreList {
    let tree = parse(query, &model, &mut identity).unwrap().unwrap();
    match Evaluator::new(index, model).evaluate(&tree).unwrap() {
        EvaluationResult::Scores(scores) => scores,
        EvaluationResult::List(_) => panic!("root operator must produce scores"),
    }
}

/// Document ids in result order.
fn docids(scores: &ScoreList) -> Vec<DocId> {
    scores.entries().iter().map(|e| e.docid).collect()
}

#[test]
fn bm25_scenario() {
    let filler = |n: usize| vec!["x"; n].join(" ");
    let doc1 = format!("a {}", filler(9));
    let doc2 = format!("a b {}", filler(18));
    let index = index_of(&[doc1.as_str(), doc2.as_str()]);
    let model = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();

    let ranking = Evaluator::new(&index, model)
        .evaluate(&parse("a b", &model, &mut identity).unwrap().unwrap())
        .unwrap()
        .into_ranking(&model, &index, 100)
        .unwrap();

    let idf_a = (0.5_f64 / 2.5).ln();
    let expected_doc1 = idf_a / 1.9;
    let expected_doc2 = idf_a * 0.4;

    assert_eq!(docids(&ranking), vec![1, 0]);
    assert!((ranking.entries()[0].score - expected_doc2).abs() < 1e-9);
    assert!((ranking.entries()[1].score - expected_doc1).abs() < 1e-9);
}

#[test]
fn near_distance_end_to_end() {
    // Gap 1 in d0, gap 2 in d1, reversed in d2.
    let index = index_of(&["a b", "a x b", "b a"]);
    let model = RetrievalModel::RankedBoolean;
    assert_eq!(docids(&scores(&index, model, "#near/1(a b)")), vec![0]);
    assert_eq!(docids(&scores(&index, model, "#near/2(a b)")), vec![0, 1]);
}

#[test]
fn window_width_end_to_end() {
    // a and b at positions {5, 7} in d0 and {5, 9} in d1.
    let index = index_of(&["x x x x x a x b", "x x x x x a x x x b"]);
    let model = RetrievalModel::RankedBoolean;
    assert_eq!(docids(&scores(&index, model, "#window/3(b a)")), vec![0]);
    assert_eq!(docids(&scores(&index, model, "#window/5(b a)")), vec![0, 1]);
}

#[test]
fn parsed_syn_matches_direct_scoring() {
    let index = index_of(&["a x x", "b b x", "x x", "a b"]);
    let model = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();

    let parsed = scores(&index, model, "#syn(a b)");
    let merged = syn(
        "body",
        &[
            index.postings("a", "body").unwrap(),
            index.postings("b", "body").unwrap(),
        ],
    );
    let (direct, _) = score_list(&model, &index, &merged).unwrap();

    assert_eq!(docids(&parsed), docids(&direct));
    for (p, d) in parsed.entries().iter().zip(direct.entries()) {
        assert!((p.score - d.score).abs() < 1e-12);
    }
}

#[test]
fn unranked_results_sort_by_external_id() {
    let mut builder = MemoryIndex::builder();
    for id in ["GX-3", "GX-1", "GX-2"] {
        builder.add_tokens(id, &[("body", "crab")]).unwrap();
    }
    let index = builder.build();
    let model = RetrievalModel::UnrankedBoolean;
    let ranking = Evaluator::new(&index, model)
        .evaluate(&parse("crab", &model, &mut identity).unwrap().unwrap())
        .unwrap()
        .into_ranking(&model, &index, 100)
        .unwrap();
    let ids: Vec<_> = ranking
        .entries()
        .iter()
        .map(|e| index.external_id(e.docid).unwrap())
        .collect();
    assert_eq!(ids, vec!["GX-1", "GX-2", "GX-3"]);
}

/// Random documents, each containing a subset of the terms `a`, `b` and `c`.
fn documents() -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    prop::collection::vec(prop::collection::btree_set(0usize..3, 0..=3), 1..40)
}

/// Random documents given as occurrence counts of `a` and `b`, zero meaning absent.
fn term_counts() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..4, 0usize..4), 1..40)
}

/// Indexes documents with `a` and `b` repeated per their counts, plus a filler token.
fn index_of_counts(docs: &[(usize, usize)]) -> MemoryIndex {
    let bodies: Vec<String> = docs
        .iter()
        .map(|&(a, b)| {
            let mut words = vec!["z"];
            words.extend(iter::repeat_n("a", a));
            words.extend(iter::repeat_n("b", b));
            words.join(" ")
        })
        .collect();
    let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
    index_of(&refs)
}

/// Indexes documents built from term subsets; an empty subset becomes a filler token.
fn index_of_sets(docs: &[BTreeSet<usize>]) -> MemoryIndex {
    const TERMS: [&str; 3] = ["a", "b", "c"];
    let bodies: Vec<String> = docs
        .iter()
        .map(|set| {
            let words: Vec<&str> = set.iter().map(|&t| TERMS[t]).collect();
            if words.is_empty() { "z".to_string() } else { words.join(" ") }
        })
        .collect();
    let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
    index_of(&refs)
}

proptest! {
    #[test]
    fn boolean_and_is_intersection(docs in documents()) {
        let index = index_of_sets(&docs);
        let result = scores(&index, RetrievalModel::UnrankedBoolean, "#and(a b c)");
        let expected: Vec<DocId> = docs
            .iter()
            .enumerate()
            .filter(|(_, set)| set.len() == 3)
            .map(|(i, _)| i as DocId)
            .collect();
        prop_assert_eq!(docids(&result), expected);
        prop_assert!(result.entries().iter().all(|e| e.score == 1.0));
    }

    #[test]
    fn boolean_or_is_union(docs in documents()) {
        let index = index_of_sets(&docs);
        let result = scores(&index, RetrievalModel::RankedBoolean, "#or(a c)");
        let expected: Vec<DocId> = docs
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(&0) || set.contains(&2))
            .map(|(i, _)| i as DocId)
            .collect();
        prop_assert_eq!(docids(&result), expected);
        prop_assert!(result.entries().iter().all(|e| e.score == 1.0));
    }

    #[test]
    fn ranked_or_scores_the_max_term_frequency(docs in term_counts()) {
        let index = index_of_counts(&docs);
        let result = scores(&index, RetrievalModel::RankedBoolean, "#or(a b)");
        let expected: Vec<(DocId, f64)> = docs
            .iter()
            .enumerate()
            .map(|(i, &(a, b))| (i as DocId, a.max(b)))
            .filter(|&(_, tf)| tf > 0)
            .map(|(docid, tf)| (docid, tf as f64))
            .collect();
        let actual: Vec<(DocId, f64)> =
            result.entries().iter().map(|e| (e.docid, e.score)).collect();
        prop_assert_eq!(actual, expected);
    }
}
