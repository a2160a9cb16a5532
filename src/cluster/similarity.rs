use linfa_nn::distance::Distance;
use ndarray::{Array2, ArrayView, Dimension};
use rayon::prelude::*;

use crate::cluster::dbscan::observations;
use crate::utils::math::{cosine_similarity, quantile_sorted};

/// Cosine similarity clipped into [0, 1], and its distance `1 - s`.
/// A zero-norm side has similarity 0 with everything, itself included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClippedCosine;

impl ClippedCosine {
    pub fn similarity<D: Dimension>(&self, a: ArrayView<f64, D>, b: ArrayView<f64, D>) -> f64 {
        let raw = match (a.as_slice(), b.as_slice()) {
            (Some(a), Some(b)) => cosine_similarity(a, b),
            _ => {
                let a: Vec<f64> = a.iter().copied().collect();
                let b: Vec<f64> = b.iter().copied().collect();
                cosine_similarity(&a, &b)
            }
        };
        raw.clamp(0.0, 1.0)
    }
}

impl Distance<f64> for ClippedCosine {
    #[inline]
    fn distance<D: Dimension>(&self, a: ArrayView<f64, D>, b: ArrayView<f64, D>) -> f64 {
        (1.0 - self.similarity(a, b)).max(0.0)
    }
}

/// Dense pairwise cosine-similarity matrix, clipped into [0, 1].
///
/// Memory is O(n²): callers must cap the phrase count of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Self {
        Self::from_observations(&observations(vectors))
    }

    /// Rows are computed in parallel; each row is independent so the result
    /// does not depend on scheduling.
    pub fn from_observations(observations: &Array2<f64>) -> Self {
        let n = observations.nrows();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| ClippedCosine.similarity(observations.row(i), observations.row(j)))
                    .collect()
            })
            .collect();
        Self { n, data: rows.into_iter().flatten().collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// d = max(0, 1 - s)
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        (1.0 - self.similarity(i, j)).max(0.0)
    }

    /// Quantile of the off-diagonal similarities (upper triangle)
    pub fn off_diagonal_quantile(&self, q: f64) -> Option<f64> {
        let mut values: Vec<f64> = (0..self.n)
            .flat_map(|i| ((i + 1)..self.n).map(move |j| (i, j)))
            .map(|(i, j)| self.similarity(i, j))
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        quantile_sorted(&values, q)
    }
}
