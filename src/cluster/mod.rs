//! Phrase grouping.
//!
//! similarity matrix → base density clustering → noise reassignment →
//! oversized-cluster splitting. Every step is a pure function of the
//! previous partition, so the same vectors always give the same result.

pub mod dbscan;
pub mod partition;
pub mod similarity;

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::dbscan::{dbscan, observations};
use crate::cluster::partition::{ClusterId, Partition};
use crate::cluster::similarity::SimilarityMatrix;
use crate::config::{ClusterConfig, EpsilonStrategy};

/// Final grouping of phrase indices.
/// `clusters` and `unassigned` together cover `0..n` exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub clusters: BTreeMap<ClusterId, Vec<usize>>,
    /// indices left outside every cluster, surfaced later as singletons
    pub unassigned: Vec<usize>,
}

impl ClusterAssignment {
    pub fn from_partition(partition: &Partition) -> Self {
        Self { clusters: partition.clusters(), unassigned: partition.unassigned() }
    }

    /// Number of indices covered
    pub fn len(&self) -> usize {
        self.clusters.values().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every group in output order: clusters by id, then each unassigned
    /// index on its own
    pub fn groups(&self) -> Vec<Vec<usize>> {
        self.clusters
            .values()
            .cloned()
            .chain(self.unassigned.iter().map(|&i| vec![i]))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Base clustering radius for this matrix
    pub fn resolve_epsilon(&self, sim: &SimilarityMatrix) -> f64 {
        match self.config.epsilon {
            EpsilonStrategy::Fixed(eps) => eps,
            EpsilonStrategy::Quantile { quantile, min, max } => match sim.off_diagonal_quantile(quantile) {
                Some(q) => (1.0 - q).clamp(min, max),
                None => max,
            },
        }
    }

    /// Group phrases by vector similarity.
    ///
    /// # Arguments
    /// * `phrases` - phrase texts, only used for diagnostics
    /// * `vectors` - one vector per phrase, same order
    pub fn cluster(&self, phrases: &[String], vectors: &[Vec<f32>]) -> ClusterAssignment {
        debug_assert_eq!(phrases.len(), vectors.len(), "phrases and vectors must be parallel");
        if vectors.is_empty() {
            return ClusterAssignment::default();
        }
        let assignment = self.cluster_observations(&observations(vectors));
        if tracing::enabled!(tracing::Level::DEBUG) {
            for (id, members) in &assignment.clusters {
                let sample: Vec<&str> = members.iter().take(3).filter_map(|&i| phrases.get(i).map(String::as_str)).collect();
                debug!(cluster = %id, size = members.len(), ?sample, "cluster");
            }
        }
        assignment
    }

    /// Same as `cluster` over an observation matrix, one row per phrase
    pub fn cluster_observations(&self, observations: &Array2<f64>) -> ClusterAssignment {
        let n = observations.nrows();
        let sim = SimilarityMatrix::from_observations(observations);
        let eps = self.resolve_epsilon(&sim);
        let labels = dbscan(observations, eps, self.config.min_samples);
        let base = Partition::from_labels(&labels);
        debug!(
            phrases = n,
            eps,
            clusters = base.clusters().len(),
            noise = base.unassigned().len(),
            "base clustering"
        );

        let reassigned = base.reassign_noise(&sim, self.config.reassign_threshold);
        let split = reassigned.split_oversized(observations, &self.config);
        let assignment = ClusterAssignment::from_partition(&split);
        debug!(
            clusters = assignment.clusters.len(),
            unassigned = assignment.unassigned.len(),
            "clustering done"
        );
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OversizePolicy;
    use proptest::prelude::*;

    fn at_degrees(degrees: &[f64]) -> Vec<Vec<f32>> {
        degrees
            .iter()
            .map(|d| {
                let r = d.to_radians();
                vec![r.cos() as f32, r.sin() as f32]
            })
            .collect()
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    fn assert_covers(assignment: &ClusterAssignment, n: usize) {
        let mut seen: Vec<usize> = assignment.groups().into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn groups_close_vectors_and_leaves_outlier() {
        let vectors = at_degrees(&[0.0, 90.0, 5.0, 95.0, 180.0]);
        let engine = ClusterEngine::default();
        let out = engine.cluster(&names(5), &vectors);
        let groups: Vec<Vec<usize>> = out.clusters.values().cloned().collect();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(out.unassigned, vec![4]);
        assert_covers(&out, 5);
    }

    #[test]
    fn zero_vectors_stay_apart() {
        let vectors = vec![vec![0.0f32, 0.0]; 3];
        let out = ClusterEngine::default().cluster(&names(3), &vectors);
        assert!(out.clusters.is_empty());
        assert_eq!(out.unassigned, vec![0, 1, 2]);
    }

    #[test]
    fn empty_input_gives_empty_assignment() {
        let out = ClusterEngine::default().cluster(&[], &[]);
        assert!(out.is_empty());
        assert!(out.groups().is_empty());
    }

    #[test]
    fn single_phrase_is_unassigned() {
        let out = ClusterEngine::default().cluster(&names(1), &at_degrees(&[0.0]));
        assert_eq!(out.unassigned, vec![0]);
    }

    #[test]
    fn strict_radius_catches_noise_that_reassignment_recovers() {
        let engine = ClusterEngine::new(ClusterConfig {
            epsilon: EpsilonStrategy::Fixed(0.1),
            ..ClusterConfig::default()
        });
        let out = engine.cluster(&names(3), &at_degrees(&[0.0, 5.0, 40.0]));
        assert_eq!(out.clusters[&ClusterId(0)], vec![0, 1, 2]);
        assert!(out.unassigned.is_empty());
    }

    #[test]
    fn quantile_epsilon_is_clamped() {
        let sim = SimilarityMatrix::from_vectors(&at_degrees(&[0.0, 0.0, 90.0]));
        let engine = ClusterEngine::new(ClusterConfig {
            epsilon: EpsilonStrategy::Quantile { quantile: 0.5, min: 0.05, max: 0.5 },
            ..ClusterConfig::default()
        });
        // off-diagonal similarities 1, 0, 0 → median 0 → 1 - 0 clamped to max
        assert_eq!(engine.resolve_epsilon(&sim), 0.5);
        let tight = SimilarityMatrix::from_vectors(&at_degrees(&[0.0, 0.0, 0.0]));
        assert_eq!(engine.resolve_epsilon(&tight), 0.05);
        let single = SimilarityMatrix::from_vectors(&at_degrees(&[0.0]));
        assert_eq!(engine.resolve_epsilon(&single), 0.5);
    }

    fn arb_vectors() -> impl Strategy<Value = Vec<Vec<f32>>> {
        prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 0..40)
    }

    proptest! {
        #[test]
        fn partition_covers_every_index_once(vectors in arb_vectors()) {
            let n = vectors.len();
            for policy in [OversizePolicy::Keep, OversizePolicy::Chunk] {
                let engine = ClusterEngine::new(ClusterConfig { oversize_policy: policy, ..ClusterConfig::default() });
                let out = engine.cluster(&names(n), &vectors);
                let mut seen: Vec<usize> = out.groups().into_iter().flatten().collect();
                seen.sort_unstable();
                prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
                prop_assert!(out.clusters.values().all(|m| !m.is_empty()));
            }
        }

        #[test]
        fn clustering_is_deterministic(vectors in arb_vectors()) {
            let engine = ClusterEngine::default();
            let a = engine.cluster(&names(vectors.len()), &vectors);
            let b = engine.cluster(&names(vectors.len()), &vectors);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn chunked_clusters_respect_size_threshold(n in 6usize..30) {
            let vectors = vec![vec![1.0f32, 0.0]; n];
            let config = ClusterConfig { oversize_policy: OversizePolicy::Chunk, ..ClusterConfig::default() };
            let threshold = config.size_threshold(n);
            let out = ClusterEngine::new(config).cluster(&names(n), &vectors);
            prop_assert!(out.clusters.values().all(|m| m.len() <= threshold));
            prop_assert!(out.unassigned.is_empty());
        }
    }
}
