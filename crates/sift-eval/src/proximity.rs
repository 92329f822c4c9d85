//! Synonym and proximity operators over inverted lists.

use sift_index::{DocId, InvertedList, Posting};

use crate::cursor::{DaatCursor, min_docid};

/// Union of `lists`. Positions of a document are merged, and a position shared by several
/// lists counts once.
///
/// The merged term frequency is the number of distinct positions, so it equals the sum of the
/// lists' term frequencies only when they never occupy the same position. `#syn(a a)` scores
/// like `a`, and postings keep strictly increasing positions for the proximity operators.
pub fn syn(field: &str, lists: &[InvertedList]) -> InvertedList {
    let mut cursors: Vec<DaatCursor<'_, Posting>> =
        lists.iter().map(|l| DaatCursor::new(l.postings())).collect();
    let mut result = InvertedList::new(field);

    while let Some(docid) = min_docid(&cursors) {
        let mut positions: Vec<u32> = cursors
            .iter_mut()
            .filter_map(|c| c.take(docid))
            .flat_map(|p| p.positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        result.append_posting(docid, positions);
    }
    result
}

/// Ordered proximity: the lists' terms appear in order, each at most `distance` positions after
/// the previous one. Every match records the position of the last list's term.
pub fn near(field: &str, lists: &[InvertedList], distance: u32) -> InvertedList {
    intersect(field, lists, |positions| near_matches(positions, distance))
}

/// Unordered proximity: one position from every list, all inside a span of `width` positions.
/// Every match records its largest position.
pub fn window(field: &str, lists: &[InvertedList], width: u32) -> InvertedList {
    intersect(field, lists, |positions| window_matches(positions, width))
}

/// Calls `matches` with the positions of every document found in all `lists`, keeping the
/// documents with at least one match.
fn intersect<F>(field: &str, lists: &[InvertedList], mut matches: F) -> InvertedList
where
    F: FnMut(&[&[u32]]) -> Vec<u32>,
{
    let mut result = InvertedList::new(field);
    let Some((first, rest)) = lists.split_first() else {
        return result;
    };
    let mut cursors: Vec<DaatCursor<'_, Posting>> =
        rest.iter().map(|l| DaatCursor::new(l.postings())).collect();

    for posting in first.postings() {
        if let Some(positions) = positions_in_all(posting, &mut cursors) {
            result.append_posting(posting.docid, matches(&positions));
        }
    }
    result
}

/// Positions of `posting`'s document in its own list and in every cursor, or `None` if some
/// cursor lacks the document.
fn positions_in_all<'a>(
    posting: &'a Posting,
    cursors: &mut [DaatCursor<'a, Posting>],
) -> Option<Vec<&'a [u32]>> {
    let docid: DocId = posting.docid;
    let mut positions = Vec::with_capacity(cursors.len() + 1);
    positions.push(posting.positions.as_slice());
    for cursor in cursors {
        positions.push(cursor.skip_to(docid)?.positions.as_slice());
    }
    Some(positions)
}

/// Ordered matches inside one document.
fn near_matches(positions: &[&[u32]], distance: u32) -> Vec<u32> {
    let mut idx = vec![0usize; positions.len()];
    let mut matches = Vec::new();

    'scan: while let Some(&start) = positions[0].get(idx[0]) {
        let mut last = start;
        let mut matched = true;
        for (list, i) in positions.iter().zip(idx.iter_mut()).skip(1) {
            while list.get(*i).is_some_and(|&p| p <= last) {
                *i += 1;
            }
            let Some(&pos) = list.get(*i) else {
                break 'scan;
            };
            if pos - last > distance {
                matched = false;
                break;
            }
            last = pos;
        }

        if matched {
            matches.push(last);
            idx.iter_mut().for_each(|i| *i += 1);
        } else {
            idx[0] += 1;
        }
    }
    matches
}

/// Unordered matches inside one document.
fn window_matches(positions: &[&[u32]], width: u32) -> Vec<u32> {
    let mut idx = vec![0usize; positions.len()];
    let mut matches = Vec::new();

    loop {
        let current: Option<Vec<u32>> = positions
            .iter()
            .zip(&idx)
            .map(|(list, &i)| list.get(i).copied())
            .collect();
        let Some(current) = current else {
            break;
        };
        let Some((min_list, &min)) = current.iter().enumerate().min_by_key(|&(_, p)| *p) else {
            break;
        };
        let max = current.iter().copied().max().unwrap_or(min);

        if max - min + 1 > width {
            idx[min_list] += 1;
        } else {
            matches.push(max);
            idx.iter_mut().for_each(|i| *i += 1);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(postings: &[(DocId, &[u32])]) -> InvertedList {
        let mut list = InvertedList::new("body");
        for (docid, positions) in postings {
            list.append_posting(*docid, positions.to_vec());
        }
        list
    }

    fn docs(list: &InvertedList) -> Vec<(DocId, Vec<u32>)> {
        list.postings()
            .iter()
            .map(|p| (p.docid, p.positions.clone()))
            .collect()
    }

    #[test]
    fn syn_merges_positions() {
        let a = list(&[(1, &[0, 4]), (3, &[2])]);
        let b = list(&[(1, &[4, 7]), (2, &[1])]);
        let merged = syn("body", &[a, b]);
        assert_eq!(
            docs(&merged),
            vec![(1, vec![0, 4, 7]), (2, vec![1]), (3, vec![2])]
        );
        assert_eq!(merged.collection_term_freq(), 5);
    }

    #[test]
    fn syn_of_repeated_term_is_the_term() {
        let a = list(&[(1, &[0, 4])]);
        assert_eq!(syn("body", &[a.clone(), a.clone()]), a);
    }

    #[test]
    fn syn_sums_term_frequencies_of_disjoint_positions() {
        let a = list(&[(1, &[0, 4]), (3, &[2])]);
        let b = list(&[(1, &[1]), (2, &[5])]);
        let merged = syn("body", &[a, b]);
        let tfs: Vec<(DocId, u32)> =
            merged.postings().iter().map(|p| (p.docid, p.term_freq())).collect();
        assert_eq!(tfs, vec![(1, 3), (2, 1), (3, 1)]);
        assert_eq!(merged.collection_term_freq(), 5);
    }

    #[test]
    fn near_respects_distance() {
        let a = list(&[(1, &[0, 10]), (2, &[3])]);
        let b = list(&[(1, &[2, 11]), (2, &[1])]);

        let near1 = near("body", &[a.clone(), b.clone()], 1);
        assert_eq!(docs(&near1), vec![(1, vec![11])]);

        let near2 = near("body", &[a, b], 2);
        assert_eq!(docs(&near2), vec![(1, vec![2, 11])]);
    }

    #[test]
    fn near_is_ordered() {
        let a = list(&[(1, &[5])]);
        let b = list(&[(1, &[4])]);
        assert!(near("body", &[a, b], 3).is_empty());
    }

    #[test]
    fn near_retries_from_later_first_positions() {
        // 0 is too far from 5, but 3 is close enough.
        let a = list(&[(1, &[0, 3])]);
        let b = list(&[(1, &[5])]);
        let c = list(&[(1, &[6])]);
        assert_eq!(docs(&near("body", &[a, b, c], 2)), vec![(1, vec![6])]);
    }

    #[test]
    fn near_does_not_reuse_positions() {
        let a = list(&[(1, &[0, 1])]);
        let b = list(&[(1, &[2])]);
        assert_eq!(docs(&near("body", &[a, b], 2)), vec![(1, vec![2])]);
    }

    #[test]
    fn window_is_unordered() {
        let a = list(&[(1, &[7]), (2, &[9])]);
        let b = list(&[(1, &[5]), (2, &[5])]);
        let result = window("body", &[a, b], 3);
        assert_eq!(docs(&result), vec![(1, vec![7])]);
    }

    #[test]
    fn window_advances_the_smallest_position() {
        let a = list(&[(1, &[0, 20])]);
        let b = list(&[(1, &[10, 21])]);
        assert_eq!(docs(&window("body", &[a, b], 2)), vec![(1, vec![21])]);
    }

    #[test]
    fn single_list_keeps_every_position() {
        let a = list(&[(1, &[2, 5])]);
        assert_eq!(docs(&near("body", &[a.clone()], 1)), vec![(1, vec![2, 5])]);
        assert_eq!(docs(&window("body", &[a], 1)), vec![(1, vec![2, 5])]);
    }

    #[test]
    fn no_lists_is_empty() {
        assert!(near("body", &[], 3).is_empty());
        assert!(window("body", &[], 3).is_empty());
        assert!(syn("body", &[]).is_empty());
    }
}
