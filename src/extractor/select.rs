use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use num::Num;
use serde::{Deserialize, Serialize};

/// Strategy used to pick the top-scoring term indices out of a dense
/// feature vector.
///
/// Both strategies honor the same contract: only strictly positive scores
/// qualify, the result is ordered by descending score with ties broken by
/// ascending term index, and it is never padded when fewer than `k` terms
/// qualify. The choice only trades constants: `PartialSort` ranks the whole
/// vector via partial selection, `BoundedHeap` keeps a size-`k` minimum
/// structure and wins when `k` is much smaller than the term count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Partial selection of all term indices, then walk the ranked prefix,
    /// stopping at the first non-positive score.
    PartialSort,
    /// Bounded min-ordered heap of the `k` best positive scores seen so far.
    #[default]
    BoundedHeap,
}

/// Descending score, ascending term index on ties.
///
/// Non-finite scores compare as equal here; their relative order is
/// unspecified, which is the documented limitation for NaN weights
/// (a NaN score never qualifies as positive, so it cannot enter a result).
#[inline]
fn rank_order<N: Num + Copy + PartialOrd>(scores: &[N], a: usize, b: usize) -> Ordering {
    scores[b]
        .partial_cmp(&scores[a])
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.cmp(&b))
}

/// A (score, term) pair ordered for the bounded heap: greater means
/// "better tag" (higher score, then lower term index).
struct Candidate<N> {
    score: N,
    term: usize,
}

impl<N: Num + Copy + PartialOrd> PartialEq for Candidate<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Num + Copy + PartialOrd> Eq for Candidate<N> {}

impl<N: Num + Copy + PartialOrd> PartialOrd for Candidate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: Num + Copy + PartialOrd> Ord for Candidate<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.term.cmp(&self.term))
    }
}

/// Select up to `k` term indices with the highest strictly positive scores,
/// descending, into a fresh vector.
///
/// `order` is a caller-owned scratch buffer for the `PartialSort` strategy;
/// it is rebuilt on every call and exists only to avoid reallocation when a
/// worker processes many documents.
pub(crate) fn select_top_k<N>(
    scores: &[N],
    k: usize,
    strategy: SelectionStrategy,
    order: &mut Vec<usize>,
) -> Vec<usize>
where
    N: Num + Copy + PartialOrd,
{
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }
    match strategy {
        SelectionStrategy::PartialSort => top_k_partial_sort(scores, k, order),
        SelectionStrategy::BoundedHeap => top_k_bounded_heap(scores, k),
    }
}

fn top_k_partial_sort<N>(scores: &[N], k: usize, order: &mut Vec<usize>) -> Vec<usize>
where
    N: Num + Copy + PartialOrd,
{
    order.clear();
    order.extend(0..scores.len());

    if k < order.len() {
        order.select_nth_unstable_by(k, |&a, &b| rank_order(scores, a, b));
        order.truncate(k);
    }
    order.sort_unstable_by(|&a, &b| rank_order(scores, a, b));

    let mut picked = Vec::with_capacity(k);
    for &term in order.iter().take(k) {
        // Strict positivity; the ranked prefix is truncated at the first
        // term that does not qualify.
        if scores[term] > N::zero() {
            picked.push(term);
        } else {
            break;
        }
    }
    picked
}

fn top_k_bounded_heap<N>(scores: &[N], k: usize) -> Vec<usize>
where
    N: Num + Copy + PartialOrd,
{
    // Min-ordered via Reverse: the root is the weakest kept candidate.
    let mut heap: BinaryHeap<Reverse<Candidate<N>>> = BinaryHeap::with_capacity(k);
    for (term, &score) in scores.iter().enumerate() {
        // not strictly positive (also covers NaN)
        if !(score > N::zero()) {
            continue;
        }
        let candidate = Candidate { score, term };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(mut weakest) = heap.peek_mut() {
            if candidate > weakest.0 {
                *weakest = Reverse(candidate);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(candidate)| candidate.term)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn new(seed: u32) -> Self {
            Self(seed)
        }
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
        fn next_score(&mut self) -> f32 {
            // Roughly [-4, 4) with plenty of exact-zero and duplicate values.
            ((self.next_u32() % 17) as f32 - 8.0) / 2.0
        }
    }

    fn select(scores: &[f32], k: usize, strategy: SelectionStrategy) -> Vec<usize> {
        let mut order = Vec::new();
        select_top_k(scores, k, strategy, &mut order)
    }

    #[test]
    fn picks_highest_scores_descending() {
        let scores = [0.5f32, 3.0, 1.0, 2.5];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            assert_eq!(select(&scores, 3, strategy), vec![1, 3, 2]);
        }
    }

    #[test]
    fn non_positive_scores_never_qualify() {
        let scores = [0.0f32, -1.0, 2.0, 0.0, 1.0];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            // Only two positive entries exist, so the result is shorter
            // than k and never padded.
            assert_eq!(select(&scores, 4, strategy), vec![2, 4]);
        }
    }

    #[test]
    fn all_non_positive_yields_empty() {
        let scores = [0.0f32, -0.5, 0.0];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            assert!(select(&scores, 2, strategy).is_empty());
        }
    }

    #[test]
    fn ties_break_by_ascending_term_index() {
        let scores = [2.0f32, 1.0, 2.0, 2.0];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            assert_eq!(select(&scores, 3, strategy), vec![0, 2, 3]);
        }
    }

    #[test]
    fn k_larger_than_vector_is_clamped() {
        let scores = [1.0f32, 2.0];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            assert_eq!(select(&scores, 10, strategy), vec![1, 0]);
        }
    }

    #[test]
    fn k_zero_yields_empty() {
        let scores = [1.0f32, 2.0];
        for strategy in [SelectionStrategy::PartialSort, SelectionStrategy::BoundedHeap] {
            assert!(select(&scores, 0, strategy).is_empty());
        }
    }

    #[test]
    fn nan_scores_are_excluded() {
        let scores = [1.0f32, f32::NAN, 3.0];
        // NaN is not strictly positive, so the heap never admits it.
        assert_eq!(
            select(&scores, 3, SelectionStrategy::BoundedHeap),
            vec![2, 0]
        );
    }

    #[test]
    fn strategies_agree_on_randomized_vectors() {
        let mut rng = Rng::new(0x5EED_1234);
        for &len in &[0usize, 1, 2, 7, 32, 100, 257] {
            let scores: Vec<f32> = (0..len).map(|_| rng.next_score()).collect();
            for &k in &[0usize, 1, 3, 10, len] {
                let a = select(&scores, k, SelectionStrategy::PartialSort);
                let b = select(&scores, k, SelectionStrategy::BoundedHeap);
                assert_eq!(a, b, "strategy divergence at len={len} k={k}");
            }
        }
    }
}
