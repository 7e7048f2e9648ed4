use std::ops::AddAssign;

use num::Num;
use rayon::prelude::*;

use super::matrix::TermWeightMatrix;

/// Per-worker scratch reused across the documents a worker processes.
///
/// One instance lives on each rayon worker; nothing here is shared. The
/// feature vector is zeroed at the start of every document, the order
/// buffer is rebuilt by the selector.
pub(crate) struct FeatureScratch<N> {
    /// Dense similarity-weighted term scores, length `n_terms`.
    pub features: Vec<N>,
    /// Index scratch for the partial-sort selection strategy.
    pub order: Vec<usize>,
}

impl<N> FeatureScratch<N>
where
    N: Num + Copy,
{
    pub fn new(n_terms: usize) -> Self {
        Self {
            features: vec![N::zero(); n_terms],
            order: Vec::new(),
        }
    }
}

/// Compute the dense similarity block for one batch of document rows.
///
/// Entry `(r, j)` of the returned row-major `n_rows x n_docs` block is the
/// dot product of batch row `start + r` against corpus row `j`. This is the
/// expensive step of the pipeline; the block rows are independent, so they
/// are computed in parallel. The block is batch-local and dropped once the
/// batch finishes, bounding peak memory to `O(batch_size * n_docs)`.
pub(crate) fn similarity_block<N>(
    matrix: &TermWeightMatrix<N>,
    start: usize,
    n_rows: usize,
) -> Vec<N>
where
    N: Num + Copy + AddAssign + Send + Sync,
{
    let n_docs = matrix.n_docs();
    let mut block = vec![N::zero(); n_rows * n_docs];
    block
        .par_chunks_mut(n_docs.max(1))
        .enumerate()
        .for_each(|(r, sims)| {
            let row = start + r;
            for (j, sim) in sims.iter_mut().enumerate() {
                *sim = matrix.row_dot(row, j);
            }
        });
    block
}

/// Accumulate one document's dense feature vector from its similarity row.
///
/// `features[t] = sum over corpus docs j of sim[j] * weight[j][t]`, a
/// similarity-weighted centroid of the whole corpus's term profiles.
/// Documents similar to many others accumulate broad term signal; a
/// document similar to none beyond itself keeps only its own scaled
/// weights. Corpus docs with a similarity of exactly zero contribute
/// nothing and are skipped; the accumulation order over `j` is fixed
/// ascending, so the result does not depend on scheduling.
pub(crate) fn accumulate_features<N>(
    matrix: &TermWeightMatrix<N>,
    sims: &[N],
    features: &mut [N],
) where
    N: Num + Copy + AddAssign,
{
    features.fill(N::zero());
    for (j, &sim) in sims.iter().enumerate() {
        if sim == N::zero() {
            continue;
        }
        let (cols, vals) = matrix.row(j);
        for (&col, &val) in cols.iter().zip(vals.iter()) {
            features[col] += sim * val;
        }
    }
}
