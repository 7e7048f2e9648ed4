use std::ops::AddAssign;

use num::Num;
use rayon::prelude::*;

use super::matrix::TermWeightMatrix;
use super::progress::ProgressSink;
use super::select::{select_top_k, SelectionStrategy};
use super::similarity::{accumulate_features, similarity_block, FeatureScratch};

/// Drive the full pipeline over `[0, n_docs)` in contiguous batches.
///
/// Batches run strictly sequentially; inside a batch the per-document work
/// (feature accumulation plus selection) fans out across the rayon pool,
/// each worker owning a private reused [`FeatureScratch`]. Every document
/// writes its tag list into its own pre-sized slot, so execution order
/// inside a batch never shows up in the output. `k` and `batch_size` are
/// assumed already clamped by the caller.
pub(crate) fn run_batches<N>(
    matrix: &TermWeightMatrix<N>,
    k: usize,
    strategy: SelectionStrategy,
    batch_size: usize,
    progress: &dyn ProgressSink,
) -> Vec<Vec<usize>>
where
    N: Num + Copy + AddAssign + PartialOrd + Send + Sync,
{
    let n_docs = matrix.n_docs();
    if n_docs == 0 {
        return Vec::new();
    }

    let n_batches = n_docs.div_ceil(batch_size);
    let mut lists: Vec<Vec<usize>> = vec![Vec::new(); n_docs];

    for batch in 0..n_batches {
        let start = batch * batch_size;
        let n_rows = batch_size.min(n_docs - start);
        progress.batch_started(batch, n_batches);

        let block = similarity_block(matrix, start, n_rows);
        let batch_lists: Vec<Vec<usize>> = block
            .par_chunks(n_docs)
            .map_init(
                || FeatureScratch::new(matrix.n_terms()),
                |scratch, sims| {
                    accumulate_features(matrix, sims, &mut scratch.features);
                    select_top_k(&scratch.features, k, strategy, &mut scratch.order)
                },
            )
            .collect();

        for (r, tags) in batch_lists.into_iter().enumerate() {
            lists[start + r] = tags;
        }
    }

    lists
}
