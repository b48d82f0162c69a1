// Feature index: binary genre vectors and the item similarity matrix.
//
// Built explicitly from a catalog at startup and handed to whoever needs it.
// Nothing here is global; rebuilding means building a new FeatureIndex.

pub mod cosine;
pub mod matrix;
pub mod vocabulary;

use std::time::Instant;

use tracing::info;

use crate::catalog::Catalog;

pub use cosine::cosine_similarity;
pub use matrix::SimilarityMatrix;
pub use vocabulary::Vocabulary;

/// Binary presence vector of an item over the tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    components: Vec<u8>,
}

impl FeatureVector {
    /// Encode a tag set against a vocabulary: component i is 1 when the
    /// i-th vocabulary tag is present.
    pub fn encode<'a, I>(vocabulary: &Vocabulary, tags: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut components = vec![0u8; vocabulary.len()];
        for tag in tags {
            if let Some(i) = vocabulary.index_of(tag) {
                components[i] = 1;
            }
        }
        Self { components }
    }

    pub fn from_components(components: Vec<u8>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[u8] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Ascending indices of the set components.
    pub fn active_positions(&self) -> Vec<usize> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit != 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Dense float form, for use with `cosine_similarity`.
    pub fn to_f64(&self) -> Vec<f64> {
        self.components.iter().map(|&bit| bit as f64).collect()
    }
}

/// Vocabulary, per-item feature vectors, and the similarity matrix, all keyed
/// by catalog position.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    vocabulary: Vocabulary,
    vectors: Vec<FeatureVector>,
    similarity: SimilarityMatrix,
}

impl FeatureIndex {
    /// Build the index for a catalog. O(N·V) for the vectors and
    /// O(N²·T) for the matrix, T being tags per item.
    pub fn build(catalog: &Catalog) -> Self {
        let started = Instant::now();

        let vocabulary = Vocabulary::from_tags(catalog.items().iter().flat_map(|item| &item.tags));
        let vectors: Vec<FeatureVector> = catalog
            .items()
            .iter()
            .map(|item| FeatureVector::encode(&vocabulary, &item.tags))
            .collect();
        let similarity = SimilarityMatrix::from_vectors(&vectors);

        info!(
            items = vectors.len(),
            tags = vocabulary.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built feature index"
        );

        Self {
            vocabulary,
            vectors,
            similarity,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Feature vector of the item at a catalog position.
    pub fn vector(&self, position: usize) -> Option<&FeatureVector> {
        self.vectors.get(position)
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
