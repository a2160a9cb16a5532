//! Density clustering over phrase vectors, run through `linfa-clustering`.
//!
//! Distances are `ClippedCosine`, the same values the similarity matrix
//! reports, so base clustering, reassignment and splitting all agree on what
//! "close" means.

use linfa::prelude::*;
use linfa_clustering::Dbscan;
use linfa_nn::LinearSearch;
use ndarray::{Array2, Axis};
use tracing::warn;

use crate::cluster::similarity::ClippedCosine;

/// One row per vector. All vectors are expected to share one length; a
/// shorter row is zero-padded.
pub fn observations(vectors: &[Vec<f32>]) -> Array2<f64> {
    let dim = vectors.iter().map(Vec::len).max().unwrap_or(0);
    Array2::from_shape_fn((vectors.len(), dim), |(i, j)| {
        vectors[i].get(j).copied().unwrap_or(0.0) as f64
    })
}

/// Rows of `observations` at `indices`, in that order
pub fn select_rows(observations: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    observations.select(Axis(0), indices)
}

/// DBSCAN labels, one per row.
///
/// `Some(k)` is the k-th cluster found in row order, `None` is noise. The
/// neighbourhood of a row is every row within `eps` (inclusive), itself
/// included; a row is core when that neighbourhood holds at least
/// `min_samples` rows.
///
/// Out-of-range parameters (`min_samples < 2`, `eps <= 0`) leave every row
/// as noise.
pub fn dbscan(observations: &Array2<f64>, eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let n = observations.nrows();
    if n == 0 {
        return Vec::new();
    }
    if min_samples < 2 || !(eps > 0.0) {
        warn!(eps, min_samples, "dbscan parameters out of range, all points left as noise");
        return vec![None; n];
    }
    // one ulp past eps: a point at exactly eps is still a neighbour
    let tolerance = next_up(eps);
    match Dbscan::params_with(min_samples, ClippedCosine, LinearSearch::new())
        .tolerance(tolerance)
        .transform(observations)
    {
        Ok(labels) => labels.to_vec(),
        Err(err) => {
            warn!(error = %err, eps, min_samples, "dbscan failed, all points left as noise");
            vec![None; n]
        }
    }
}

#[inline]
fn next_up(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        x
    }
}

/// Number of clusters in a `dbscan` result
pub fn cluster_count(labels: &[Option<usize>]) -> usize {
    labels.iter().flatten().max().map_or(0, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linfa_nn::distance::Distance;
    use ndarray::array;

    fn at_degrees(degrees: &[f64]) -> Array2<f64> {
        let vectors: Vec<Vec<f32>> = degrees
            .iter()
            .map(|d| {
                let r = d.to_radians();
                vec![r.cos() as f32, r.sin() as f32]
            })
            .collect();
        observations(&vectors)
    }

    #[test]
    fn clipped_cosine_distance() {
        let d = ClippedCosine;
        let x = array![1.0, 0.0];
        let y = array![0.0, 1.0];
        let z = array![-1.0, 0.0];
        let zero = array![0.0, 0.0];
        assert!(d.distance(x.view(), x.view()).abs() < 1e-12);
        assert!((d.distance(x.view(), y.view()) - 1.0).abs() < 1e-12);
        // opposite vectors clip to similarity 0
        assert!((d.distance(x.view(), z.view()) - 1.0).abs() < 1e-12);
        assert_eq!(d.distance(x.view(), zero.view()), 1.0);
    }

    #[test]
    fn two_groups_and_noise() {
        let obs = at_degrees(&[0.0, 5.0, 10.0, 80.0, 85.0, 170.0]);
        let labels = dbscan(&obs, 0.05, 2);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0), Some(1), Some(1), None]);
        assert_eq!(cluster_count(&labels), 2);
    }

    #[test]
    fn border_point_joins_through_core_neighbour() {
        // 3 reaches 2 only, so it is a border point of the cluster
        let obs = at_degrees(&[0.0, 10.0, 20.0, 45.0]);
        let eps = 1.0 - 30f64.to_radians().cos();
        let labels = dbscan(&obs, eps, 3);
        assert_eq!(labels, vec![Some(0); 4]);
        let strict = dbscan(&obs, eps, 5);
        assert_eq!(strict, vec![None; 4]);
    }

    #[test]
    fn identical_vectors_sit_inside_any_radius() {
        let obs = at_degrees(&[0.0, 0.0, 90.0]);
        let labels = dbscan(&obs, 0.01, 2);
        assert_eq!(labels, vec![Some(0), Some(0), None]);
    }

    #[test]
    fn out_of_range_parameters_leave_noise() {
        let obs = at_degrees(&[0.0, 0.0]);
        assert_eq!(dbscan(&obs, 0.3, 1), vec![None, None]);
        assert_eq!(dbscan(&obs, 0.0, 2), vec![None, None]);
    }

    #[test]
    fn works_on_selected_rows() {
        let obs = at_degrees(&[0.0, 90.0, 3.0, 90.0, 6.0]);
        let sub = select_rows(&obs, &[0, 2, 4]);
        assert_eq!(dbscan(&sub, 0.01, 2), vec![Some(0), Some(0), Some(0)]);
        assert!(dbscan(&Array2::zeros((0, 2)), 0.1, 2).is_empty());
    }

    #[test]
    fn short_rows_are_zero_padded() {
        let obs = observations(&[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(obs, array![[1.0, 2.0], [3.0, 0.0]]);
    }
}
