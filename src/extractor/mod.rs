pub mod matrix;
pub mod progress;
pub mod select;
pub mod vocab;

mod batch;
mod similarity;

use std::fmt::Debug;
use std::ops::AddAssign;

use num::Num;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use self::matrix::TermWeightMatrix;
use self::progress::{NoProgress, ProgressSink};
use self::select::SelectionStrategy;

/// Default batch span in documents.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Per-document ranked tag lists, one entry per document index.
///
/// Each list holds up to the requested number of term indices, ordered by
/// descending feature score (ties by ascending term index) and truncated at
/// the first non-positive score; a document with no qualifying terms gets
/// an empty list.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssignments {
    lists: Vec<Vec<usize>>,
}

impl TagAssignments {
    /// Number of documents covered. Always equals the corpus size of the
    /// call that produced this value.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Ranked term indices of one document.
    pub fn get(&self, doc: usize) -> Option<&[usize]> {
        self.lists.get(doc).map(Vec::as_slice)
    }

    /// Iterate `(document index, ranked term indices)` in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.lists.iter().enumerate().map(|(d, l)| (d, l.as_slice()))
    }

    /// Consume into the raw per-document lists.
    pub fn into_lists(self) -> Vec<Vec<usize>> {
        self.lists
    }
}

impl Debug for TagAssignments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "TagAssignments [")?;
            for (doc, tags) in self.iter() {
                writeln!(f, "    {}: {:?}", doc, tags)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.lists).finish()
        }
    }
}

/// Tag extraction pipeline configuration.
///
/// Holds the requested tag count, the batch span that bounds peak memory,
/// and the top-K selection strategy. The extractor itself is stateless
/// across calls; the sparse matrix and all batch-local structures live only
/// for the duration of one `extract` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagExtractor {
    n_tags: usize,
    batch_size: usize,
    strategy: SelectionStrategy,
}

impl TagExtractor {
    /// Create an extractor requesting `n_tags` tags per document, with the
    /// default batch size and selection strategy.
    pub fn new(n_tags: usize) -> Self {
        Self {
            n_tags,
            batch_size: DEFAULT_BATCH_SIZE,
            strategy: SelectionStrategy::default(),
        }
    }

    /// Batch span in documents. Larger spans trade memory for fewer
    /// similarity-block setups; the output never changes with it.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Top-K selection strategy.
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run the pipeline over a prepared matrix without progress reporting.
    pub fn extract<N>(&self, matrix: &TermWeightMatrix<N>) -> Result<TagAssignments, ExtractError>
    where
        N: Num + Copy + AddAssign + PartialOrd + Send + Sync,
    {
        self.extract_with_progress(matrix, &NoProgress)
    }

    /// Run the pipeline over a prepared matrix, notifying `progress` once
    /// per batch start.
    ///
    /// The effective tag count is `min(n_tags, n_terms)` and the effective
    /// batch span `min(batch_size, n_docs)`. Non-finite weights are not
    /// detected; they propagate into the rankings exactly as IEEE
    /// arithmetic orders them.
    pub fn extract_with_progress<N>(
        &self,
        matrix: &TermWeightMatrix<N>,
        progress: &dyn ProgressSink,
    ) -> Result<TagAssignments, ExtractError>
    where
        N: Num + Copy + AddAssign + PartialOrd + Send + Sync,
    {
        if self.batch_size == 0 {
            return Err(ExtractError::ZeroBatchSize);
        }
        let k = self.n_tags.min(matrix.n_terms());
        let batch_size = self.batch_size.min(matrix.n_docs()).max(1);
        let lists = batch::run_batches(matrix, k, self.strategy, batch_size, progress);
        Ok(TagAssignments { lists })
    }
}

/// One-shot entry point: triplets in, ranked tag indices out.
///
/// Assembles the weight matrix from coordinate triplets (duplicates sum)
/// and runs the extraction pipeline. All input validation happens here,
/// before any batch processing; a well-formed call always returns one
/// ranked list per document.
///
/// # Arguments
/// * `rows`, `cols`, `values` - the sparse matrix triplets, equal length
/// * `n_docs`, `n_terms` - matrix dimensions
/// * `n_tags` - requested tags per document, clamped to `n_terms`
/// * `batch_size` - batch span, clamped to `n_docs`; must be at least 1
pub fn get_tags_indices<N>(
    rows: &[usize],
    cols: &[usize],
    values: &[N],
    n_docs: usize,
    n_terms: usize,
    n_tags: usize,
    batch_size: usize,
) -> Result<TagAssignments, ExtractError>
where
    N: Num + Copy + AddAssign + PartialOrd + Send + Sync,
{
    let matrix = TermWeightMatrix::from_triplets(n_docs, n_terms, rows, cols, values)?;
    TagExtractor::new(n_tags)
        .with_batch_size(batch_size)
        .extract(&matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 docs x 4 terms: doc0 {t0:1, t1:2}, doc1 {t1:1, t2:1}, doc2 {t3:5}.
    // Docs 0 and 1 share term 1; doc 2 is isolated.
    const ROWS: [usize; 5] = [0, 0, 1, 1, 2];
    const COLS: [usize; 5] = [0, 1, 1, 2, 3];
    const VALS: [f32; 5] = [1.0, 2.0, 1.0, 1.0, 5.0];

    #[test]
    fn end_to_end_example() {
        let tags = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 2, 2).unwrap();
        assert_eq!(tags.len(), 3);
        // doc0 features: (5, 12, 2, 0)
        assert_eq!(tags.get(0), Some(&[1usize, 0][..]));
        // doc1 features: (2, 6, 2, 0); t0 and t2 tie at 2, lower index wins
        assert_eq!(tags.get(1), Some(&[1usize, 0][..]));
        // doc2 shares nothing: only its own term qualifies, result shorter
        // than the requested two tags
        assert_eq!(tags.get(2), Some(&[3usize][..]));
    }

    #[test]
    fn deterministic_across_batch_sizes() {
        let reference = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 2, 3).unwrap();
        for batch_size in [1, 2, 5, DEFAULT_BATCH_SIZE] {
            let tags = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 2, batch_size).unwrap();
            assert_eq!(tags, reference, "batch_size={batch_size}");
        }
        // and across repeated calls
        let again = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 2, 3).unwrap();
        assert_eq!(again, reference);
    }

    #[test]
    fn strategies_produce_identical_assignments() {
        let matrix = TermWeightMatrix::from_triplets(3, 4, &ROWS, &COLS, &VALS).unwrap();
        let sorted = TagExtractor::new(2)
            .with_strategy(SelectionStrategy::PartialSort)
            .extract(&matrix)
            .unwrap();
        let heaped = TagExtractor::new(2)
            .with_strategy(SelectionStrategy::BoundedHeap)
            .extract(&matrix)
            .unwrap();
        assert_eq!(sorted, heaped);
    }

    #[test]
    fn tag_count_is_bounded() {
        let tags = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 100, 8).unwrap();
        for (_, list) in tags.iter() {
            assert!(list.len() <= 4);
        }
        // n_tags past n_terms clamps rather than padding
        let clamped = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 4, 8).unwrap();
        assert_eq!(tags, clamped);
    }

    #[test]
    fn duplicate_triplets_match_a_single_summed_triplet() {
        let split = get_tags_indices(
            &[0, 0, 0, 1],
            &[0, 0, 1, 1],
            &[0.75f32, 0.25, 2.0, 1.0],
            2,
            2,
            2,
            4,
        )
        .unwrap();
        let summed =
            get_tags_indices(&[0, 0, 1], &[0, 1, 1], &[1.0f32, 2.0, 1.0], 2, 2, 2, 4).unwrap();
        assert_eq!(split, summed);
    }

    #[test]
    fn shape_mismatch_fails_before_processing() {
        let err = get_tags_indices(&[0usize; 5], &[0usize; 4], &[1.0f32; 5], 6, 6, 2, 4)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::ShapeMismatch {
                rows: 5,
                cols: 4,
                values: 5
            }
        );
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 2, 0).unwrap_err();
        assert_eq!(err, ExtractError::ZeroBatchSize);
    }

    #[test]
    fn document_without_weights_gets_an_empty_list() {
        // doc1 has no triplets at all
        let tags = get_tags_indices(&[0], &[0], &[1.0f32], 2, 3, 2, 2).unwrap();
        assert_eq!(tags.get(0), Some(&[0usize][..]));
        assert_eq!(tags.get(1), Some(&[][..]));
    }

    #[test]
    fn empty_corpus_returns_empty_assignments() {
        let tags = get_tags_indices::<f32>(&[], &[], &[], 0, 0, 3, 4).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn zero_requested_tags_yield_empty_lists() {
        let tags = get_tags_indices(&ROWS, &COLS, &VALS, 3, 4, 0, 2).unwrap();
        assert_eq!(tags.len(), 3);
        for (_, list) in tags.iter() {
            assert!(list.is_empty());
        }
    }

    #[test]
    fn identical_documents_reinforce_each_other() {
        // Two identical docs and one disjoint one. The twins see their own
        // self-similarity plus the twin's, so their shared term outranks
        // everything else in their lists.
        let tags = get_tags_indices(
            &[0, 1, 2],
            &[0, 0, 1],
            &[2.0f32, 2.0, 2.0],
            3,
            2,
            1,
            2,
        )
        .unwrap();
        assert_eq!(tags.get(0), Some(&[0usize][..]));
        assert_eq!(tags.get(1), Some(&[0usize][..]));
        assert_eq!(tags.get(2), Some(&[1usize][..]));
    }
}
