// Item-by-item similarity matrix.
//
// Dense, row-major, indexed by catalog position. Built once per catalog load;
// read-only afterwards, so it can be shared across concurrent requests.

use super::cosine::binary_cosine;
use super::FeatureVector;

#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Compute pairwise cosine similarity for all feature vectors.
    ///
    /// Each unordered pair is computed once and mirrored, so the matrix is
    /// symmetric by construction. Tagged items get exactly 1.0 on the
    /// diagonal; untagged items get 0.0 everywhere, diagonal included.
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let size = vectors.len();
        let mut values = vec![0.0; size * size];

        let active: Vec<Vec<usize>> = vectors.iter().map(FeatureVector::active_positions).collect();

        for i in 0..size {
            if active[i].is_empty() {
                continue;
            }
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let sim = binary_cosine(
                    sorted_overlap(&active[i], &active[j]),
                    active[i].len(),
                    active[j].len(),
                );
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }

        Self { size, values }
    }

    /// Number of rows (= number of columns = catalog size).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity between the items at positions `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Full similarity row for the item at position `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

/// Size of the intersection of two ascending index lists.
fn sorted_overlap(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}
