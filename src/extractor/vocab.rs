use std::ops::AddAssign;

use indexmap::IndexSet;
use num::Num;
use serde::{Deserialize, Serialize};

use super::TagExtractor;
use crate::error::ExtractError;

/// Term vocabulary: interned term strings with stable column indices.
///
/// Insertion order is column order, so a matrix built against a vocabulary
/// can always map its column indices back to term strings. The vocabulary
/// does not store weights or counts; it is only the string-to-index seam in
/// front of the index-level pipeline.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms (matrix columns).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Intern a term, returning its column index. Re-interning an existing
    /// term returns the original index.
    pub fn intern(&mut self, term: &str) -> usize {
        if let Some(index) = self.terms.get_index_of(term) {
            index
        } else {
            self.terms.insert_full(Box::from(term)).0
        }
    }

    /// Column index of a term, if it was interned.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    /// Term string of a column index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(AsRef::as_ref)
    }

    /// Iterate terms in column order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(AsRef::as_ref)
    }
}

/// Tag documents given as weighted term lists, returning term strings.
///
/// Convenience wrapper over the index-level pipeline for callers that have
/// per-document `(term, weight)` pairs instead of a prepared matrix: terms
/// are interned into a [`Vocabulary`], the triplets are assembled and
/// extracted with `extractor`, and the resulting indices are mapped back to
/// their terms. A term repeated within one document sums its weights, the
/// same as duplicate triplets.
pub fn tag_weighted_documents<N>(
    docs: &[Vec<(&str, N)>],
    extractor: &TagExtractor,
) -> Result<(Vocabulary, Vec<Vec<String>>), ExtractError>
where
    N: Num + Copy + AddAssign + PartialOrd + Send + Sync,
{
    let mut vocabulary = Vocabulary::new();
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (doc, terms) in docs.iter().enumerate() {
        for &(term, weight) in terms {
            rows.push(doc);
            cols.push(vocabulary.intern(term));
            values.push(weight);
        }
    }

    let matrix = super::matrix::TermWeightMatrix::from_triplets(
        docs.len(),
        vocabulary.len(),
        &rows,
        &cols,
        &values,
    )?;
    let assignments = extractor.extract(&matrix)?;

    let tagged = assignments
        .iter()
        .map(|(_, tags)| {
            tags.iter()
                // interned index, always resolvable
                .map(|&t| vocabulary.term(t).unwrap().to_string())
                .collect()
        })
        .collect();
    Ok((vocabulary, tagged))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_and_ordered() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.intern("rust"), 0);
        assert_eq!(vocab.intern("sparse"), 1);
        assert_eq!(vocab.intern("rust"), 0);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of("sparse"), Some(1));
        assert_eq!(vocab.term(0), Some("rust"));
        assert_eq!(vocab.term(2), None);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["rust", "sparse"]);
    }

    #[test]
    fn weighted_documents_round_trip_to_term_strings() {
        let docs = vec![
            vec![("rust", 1.0f32), ("parallel", 2.0)],
            vec![("parallel", 1.0), ("iterator", 1.0)],
            vec![("genome", 5.0)],
        ];
        let (vocab, tagged) =
            tag_weighted_documents(&docs, &TagExtractor::new(2).with_batch_size(2)).unwrap();

        assert_eq!(vocab.len(), 4);
        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged[0], vec!["parallel", "rust"]);
        // the isolated document keeps only its own term
        assert_eq!(tagged[2], vec!["genome"]);
    }

    #[test]
    fn repeated_terms_in_one_document_sum_their_weights() {
        let split = vec![vec![("a", 0.5f32), ("a", 0.5), ("b", 2.0)]];
        let merged = vec![vec![("a", 1.0f32), ("b", 2.0)]];
        let extractor = TagExtractor::new(2);
        let (_, split_tags) = tag_weighted_documents(&split, &extractor).unwrap();
        let (_, merged_tags) = tag_weighted_documents(&merged, &extractor).unwrap();
        assert_eq!(split_tags, merged_tags);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let (vocab, tagged) =
            tag_weighted_documents::<f32>(&[], &TagExtractor::new(3)).unwrap();
        assert!(vocab.is_empty());
        assert!(tagged.is_empty());
    }
}
