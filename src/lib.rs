/// This crate selects representative tags for every document of a corpus
/// given a sparse term-weight matrix (e.g. TF-IDF weights), by propagating
/// similarity corpus-wide: each document's term scores are the weighted sum
/// of every corpus document's term profile, weighted by how similar that
/// document is to it. The top-scoring terms become the document's tags.
pub mod error;
pub mod extractor;

/// Tag extraction pipeline.
/// The top-level struct of this crate, holding the requested tag count, the
/// batch span and the top-K selection strategy.
///
/// Documents are processed in contiguous batches so peak memory stays at
/// `O(batch_size * n_docs)` instead of `O(n_docs^2)`; inside a batch the
/// per-document work fans out across the rayon thread pool. The batch span
/// only affects locality, never the result.
pub use extractor::TagExtractor;

/// Per-document ranked tag lists.
/// One entry per document index, each an ordered (descending score)
/// sequence of term indices, truncated at the first non-positive score and
/// never padded.
pub use extractor::TagAssignments;

/// One-shot entry point: coordinate triplets in, ranked tag indices out.
/// Validates the triplet input, assembles the sparse weight matrix
/// (duplicate coordinates sum) and runs the full pipeline.
pub use extractor::get_tags_indices;

/// Row-compressed sparse document-by-term weight matrix.
/// Built once from coordinate triplets, immutable and shareable across
/// threads afterwards; per-row term indices are kept sorted so row
/// iteration and merge-join dot products run in one pass.
///
/// Generic over the scalar type (`f32` by default), like the rest of the
/// pipeline.
pub use extractor::matrix::TermWeightMatrix;

/// Top-K selection strategy for the tag selector.
///
/// Two strategies with identical observable behavior:
/// - `PartialSort`: partial selection over all term indices
/// - `BoundedHeap`: size-capped min-ordered heap, better for small K over
///   large vocabularies
pub use extractor::select::SelectionStrategy;

/// Advisory per-batch progress notifications.
/// Implemented by any `Sync` host type that wants batch-start callbacks;
/// `NoProgress` is the silent default.
pub use extractor::progress::{NoProgress, ProgressSink};

/// Term vocabulary for the string-level convenience layer.
/// Interns term strings to stable column indices (insertion order is
/// column order) and maps result indices back to terms.
pub use extractor::vocab::{tag_weighted_documents, Vocabulary};

/// Validation errors, all reported before any batch processing starts.
pub use error::ExtractError;
