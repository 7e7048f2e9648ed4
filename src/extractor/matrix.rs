use std::cmp::Ordering;
use std::ops::AddAssign;

use num::Num;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Row-compressed sparse document-by-term weight matrix.
///
/// Rows are documents, columns are terms. Dimensions are fixed at
/// construction and the matrix is immutable afterwards. Column indices
/// within a row are kept strictly increasing so that row iteration and the
/// merge-join dot product run in one pass over the stored entries.
///
/// The scalar type `N` defaults to `f32`, the precision the weight pipeline
/// accumulates in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeightMatrix<N = f32>
where
    N: Num + Copy,
{
    n_terms: usize,
    /// Row start offsets into `cols`/`vals`, length `n_docs + 1`.
    row_ptr: Vec<usize>,
    /// Column (term) indices, strictly increasing within each row.
    cols: Vec<usize>,
    /// Weights parallel to `cols`.
    vals: Vec<N>,
}

impl<N> TermWeightMatrix<N>
where
    N: Num + Copy + AddAssign,
{
    /// Assemble the matrix from unordered coordinate triplets.
    ///
    /// Duplicate `(row, col)` pairs accumulate by summation, matching the
    /// usual sparse-assembly semantics. The three slices must be the same
    /// length and every coordinate must lie inside the declared
    /// `n_docs x n_terms` shape; violations are rejected before anything is
    /// built. Non-finite weights are accepted as-is and flow through later
    /// arithmetic unchecked.
    ///
    /// # Arguments
    /// * `rows`, `cols` - triplet coordinates, `0 <= row < n_docs`,
    ///   `0 <= col < n_terms`
    /// * `values` - triplet weights, same length as the coordinate slices
    pub fn from_triplets(
        n_docs: usize,
        n_terms: usize,
        rows: &[usize],
        cols: &[usize],
        values: &[N],
    ) -> Result<Self, ExtractError> {
        if rows.len() != values.len() || cols.len() != values.len() {
            return Err(ExtractError::ShapeMismatch {
                rows: rows.len(),
                cols: cols.len(),
                values: values.len(),
            });
        }
        for (index, (&row, &col)) in rows.iter().zip(cols.iter()).enumerate() {
            if row >= n_docs || col >= n_terms {
                return Err(ExtractError::TripletOutOfBounds {
                    index,
                    row,
                    col,
                    n_docs,
                    n_terms,
                });
            }
        }

        // Counting pass: triplets per row, then prefix sums into offsets.
        let mut starts = vec![0usize; n_docs + 1];
        for &row in rows {
            starts[row + 1] += 1;
        }
        for d in 0..n_docs {
            starts[d + 1] += starts[d];
        }

        // Scatter triplets into per-row segments.
        let mut seg_cols = vec![0usize; cols.len()];
        let mut seg_vals = vec![N::zero(); values.len()];
        let mut cursor = starts.clone();
        for i in 0..rows.len() {
            let slot = cursor[rows[i]];
            seg_cols[slot] = cols[i];
            seg_vals[slot] = values[i];
            cursor[rows[i]] += 1;
        }

        // Sort each row segment by column and merge duplicates while
        // compacting into the final storage.
        let mut row_ptr = Vec::with_capacity(n_docs + 1);
        row_ptr.push(0);
        let mut out_cols = Vec::with_capacity(cols.len());
        let mut out_vals = Vec::with_capacity(values.len());
        for d in 0..n_docs {
            let seg = starts[d]..starts[d + 1];
            let mut pairs: Vec<(usize, N)> = seg_cols[seg.clone()]
                .iter()
                .copied()
                .zip(seg_vals[seg].iter().copied())
                .collect();
            pairs.sort_unstable_by_key(|&(col, _)| col);

            let row_start = out_cols.len();
            for (col, val) in pairs {
                if out_cols.len() > row_start && *out_cols.last().unwrap() == col {
                    *out_vals.last_mut().unwrap() += val;
                } else {
                    out_cols.push(col);
                    out_vals.push(val);
                }
            }
            row_ptr.push(out_cols.len());
        }

        Ok(Self {
            n_terms,
            row_ptr,
            cols: out_cols,
            vals: out_vals,
        })
    }
}

impl<N> TermWeightMatrix<N>
where
    N: Num + Copy,
{
    /// Number of documents (rows).
    #[inline]
    pub fn n_docs(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Number of terms (columns).
    #[inline]
    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.cols.len()
    }

    /// The stored `(column, weight)` arrays of one document row,
    /// column indices strictly increasing.
    #[inline]
    pub fn row(&self, doc: usize) -> (&[usize], &[N]) {
        let span = self.row_ptr[doc]..self.row_ptr[doc + 1];
        (&self.cols[span.clone()], &self.vals[span])
    }

    /// Iterate the non-zero `(column, weight)` pairs of one document row.
    pub fn row_iter(&self, doc: usize) -> impl Iterator<Item = (usize, N)> + '_ {
        let (cols, vals) = self.row(doc);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// Dot product of two document rows.
    ///
    /// Merge-join over the sorted column indices, O(nnz(a) + nnz(b)).
    /// This is the pairwise similarity used by the aggregator: zero for
    /// documents sharing no terms, proportional to the shared-term weight
    /// overlap otherwise.
    #[inline]
    pub fn row_dot(&self, a: usize, b: usize) -> N
    where
        N: AddAssign,
    {
        let (a_cols, a_vals) = self.row(a);
        let (b_cols, b_vals) = self.row(b);

        let mut acc = N::zero();
        let mut i = 0;
        let mut j = 0;
        while i < a_cols.len() && j < b_cols.len() {
            match a_cols[i].cmp(&b_cols[j]) {
                Ordering::Equal => {
                    acc += a_vals[i] * b_vals[j];
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        acc
    }
}
