// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reciprocal Rank Fusion over ranked result lists.
//!
//! RRF only looks at rank positions, so lists scored on incomparable scales
//! (keyword density, cosine distance, rerank logits) can be merged directly.

use std::collections::HashMap;

use crate::types::SearchResult;

/// RRF constant per research literature.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// A document that can take part in rank fusion.
///
/// Fusion only needs a stable identity and a way to write back the fused score;
/// every other field is carried through untouched.
pub trait Ranked: Clone {
    /// Identity used to merge the same document across lists.
    fn rank_id(&self) -> &str;

    /// Replaces the document's score with its fused score.
    fn set_fused_score(&mut self, score: f32);
}

impl Ranked for SearchResult {
    fn rank_id(&self) -> &str {
        &self.id
    }

    fn set_fused_score(&mut self, score: f32) {
        self.score = score;
    }
}

/// Two-way Reciprocal Rank Fusion.
///
/// A document at 0-based rank `r` contributes `1 / (k + r + 1)`; contributions
/// for the same id are summed. When both lists hold the same id, the copy from
/// `first` is kept. Output is sorted by fused score, descending.
pub fn reciprocal_rank_fusion<T: Ranked>(first: &[T], second: &[T], k: f32) -> Vec<T> {
    fuse([first, second], k)
}

/// N-way Reciprocal Rank Fusion with the same scoring rule.
///
/// The first list in which an id appears supplies its fields.
pub fn reciprocal_rank_fusion_many<T: Ranked>(lists: &[Vec<T>], k: f32) -> Vec<T> {
    fuse(lists.iter().map(Vec::as_slice), k)
}

fn fuse<'a, T, I>(lists: I, k: f32) -> Vec<T>
where
    T: Ranked + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut fused: Vec<(T, f32)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for list in lists {
        for (rank, doc) in list.iter().enumerate() {
            let contribution = 1.0 / (k + rank as f32 + 1.0);
            match slots.get(doc.rank_id()) {
                Some(&slot) => fused[slot].1 += contribution,
                None => {
                    slots.insert(doc.rank_id().to_string(), fused.len());
                    fused.push((doc.clone(), contribution));
                }
            }
        }
    }

    // Stable sort: equal scores stay in first-seen order.
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    fused
        .into_iter()
        .map(|(mut doc, score)| {
            doc.set_fused_score(score);
            doc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(id: &str, content: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            score: 0.9,
            content: content.to_string(),
            metadata: serde_json::Value::Null,
            memory_type: "memory".to_string(),
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    fn score_of(results: &[SearchResult], id: &str) -> f32 {
        results.iter().find(|r| r.id == id).unwrap().score
    }

    #[test]
    fn rrf_overlapping_lists() {
        // d1 at rank 0 in both, d2 only in the first, d3 only in the second.
        let keyword = vec![doc("d1", "a"), doc("d2", "b")];
        let vector = vec![doc("d1", "a"), doc("d3", "c")];

        let fused = reciprocal_rank_fusion(&keyword, &vector, DEFAULT_RRF_K);

        assert_eq!(fused[0].id, "d1");
        let expected_d1 = 2.0 / 61.0;
        assert!(
            (fused[0].score - expected_d1).abs() < 1e-6,
            "d1 score should be ~{expected_d1}, got {}",
            fused[0].score
        );
        assert!((score_of(&fused, "d2") - score_of(&fused, "d3")).abs() < 1e-6);
        assert!((score_of(&fused, "d2") - 1.0 / 62.0).abs() < 1e-6);
    }

    #[test]
    fn rrf_first_list_fields_win() {
        let keyword = vec![doc("d1", "from keyword")];
        let vector = vec![doc("d1", "from vector")];

        let fused = reciprocal_rank_fusion(&keyword, &vector, DEFAULT_RRF_K);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].content, "from keyword");

        let fused = reciprocal_rank_fusion(&vector, &keyword, DEFAULT_RRF_K);
        assert_eq!(fused[0].content, "from vector");
    }

    #[test]
    fn rrf_replaces_original_scores() {
        let fused = reciprocal_rank_fusion(&[doc("x", "x")], &[], DEFAULT_RRF_K);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-6);
    }

    #[test]
    fn rrf_empty_lists() {
        let fused: Vec<SearchResult> = reciprocal_rank_fusion(&[], &[], DEFAULT_RRF_K);
        assert!(fused.is_empty());
        let fused: Vec<SearchResult> = reciprocal_rank_fusion_many(&[], DEFAULT_RRF_K);
        assert!(fused.is_empty());
    }

    #[test]
    fn rrf_ordering_with_shared_tail() {
        // d4 is rank 2 in both lists (2/63) and beats single-list rank-1 hits (1/62).
        let a = vec![doc("d1", ""), doc("d2", ""), doc("d4", "")];
        let b = vec![doc("d1", ""), doc("d3", ""), doc("d4", "")];

        let fused = reciprocal_rank_fusion(&a, &b, DEFAULT_RRF_K);
        assert_eq!(ids(&fused)[..2], ["d1", "d4"]);
        // Tie between d2 and d3 keeps first-seen order.
        assert_eq!(ids(&fused)[2..], ["d2", "d3"]);
    }

    #[test]
    fn rrf_many_sums_across_lists() {
        let lists = vec![
            vec![doc("a", ""), doc("b", "")],
            vec![doc("b", ""), doc("c", "")],
            vec![doc("b", ""), doc("a", "")],
        ];
        let fused = reciprocal_rank_fusion_many(&lists, DEFAULT_RRF_K);

        assert_eq!(ids(&fused), vec!["b", "a", "c"]);
        let expected_b = 1.0 / 62.0 + 1.0 / 61.0 + 1.0 / 61.0;
        assert!((score_of(&fused, "b") - expected_b).abs() < 1e-6);
    }

    #[test]
    fn rrf_custom_k() {
        let fused = reciprocal_rank_fusion(&[doc("a", "")], &[doc("a", "")], 1.0);
        assert!((fused[0].score - 1.0).abs() < 1e-6);
    }

    fn id_lists() -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::vec(
            prop::collection::hash_set(0u8..20, 0..10).prop_map(|s| s.into_iter().collect()),
            1..5,
        )
    }

    fn to_docs(list: &[u8]) -> Vec<SearchResult> {
        list.iter().map(|i| doc(&format!("d{i}"), "")).collect()
    }

    proptest! {
        #[test]
        fn fused_output_is_sorted_and_distinct(lists in id_lists()) {
            let docs: Vec<Vec<SearchResult>> = lists.iter().map(|l| to_docs(l)).collect();
            let fused = reciprocal_rank_fusion_many(&docs, DEFAULT_RRF_K);

            for pair in fused.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            let mut seen = std::collections::HashSet::new();
            for r in &fused {
                prop_assert!(seen.insert(r.id.clone()));
            }
            let distinct: std::collections::HashSet<u8> = lists.iter().flatten().copied().collect();
            prop_assert_eq!(fused.len(), distinct.len());
        }

        #[test]
        fn adding_a_list_never_lowers_a_score(lists in id_lists(), extra in prop::collection::hash_set(0u8..20, 0..10)) {
            let docs: Vec<Vec<SearchResult>> = lists.iter().map(|l| to_docs(l)).collect();
            let before = reciprocal_rank_fusion_many(&docs, DEFAULT_RRF_K);

            let mut more = docs.clone();
            more.push(to_docs(&extra.into_iter().collect::<Vec<_>>()));
            let after = reciprocal_rank_fusion_many(&more, DEFAULT_RRF_K);

            for r in &before {
                prop_assert!(score_of(&after, &r.id) >= r.score);
            }
        }
    }
}
