use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cluster::dbscan::{cluster_count, dbscan, select_rows};
use crate::cluster::similarity::SimilarityMatrix;
use crate::config::{ClusterConfig, OversizePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cluster membership of one phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    Assigned(ClusterId),
    Unassigned,
}

impl Membership {
    #[inline]
    pub fn cluster(&self) -> Option<ClusterId> {
        match self {
            Membership::Assigned(id) => Some(*id),
            Membership::Unassigned => None,
        }
    }
}

/// Membership of every phrase index.
/// Each transition returns a new partition and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    members: Vec<Membership>,
}

impl Partition {
    /// From positional `dbscan` labels
    pub fn from_labels(labels: &[Option<usize>]) -> Self {
        let members = labels
            .iter()
            .map(|l| match l {
                Some(k) => Membership::Assigned(ClusterId(*k as u32)),
                None => Membership::Unassigned,
            })
            .collect();
        Self { members }
    }

    pub fn from_members(members: Vec<Membership>) -> Self {
        Self { members }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn membership(&self, index: usize) -> Membership {
        self.members[index]
    }

    pub fn members(&self) -> &[Membership] {
        &self.members
    }

    /// Smallest id not used by any cluster
    pub fn next_id(&self) -> ClusterId {
        self.members
            .iter()
            .filter_map(Membership::cluster)
            .max()
            .map_or(ClusterId(0), |ClusterId(m)| ClusterId(m + 1))
    }

    /// Cluster id → ascending member indices
    pub fn clusters(&self) -> BTreeMap<ClusterId, Vec<usize>> {
        let mut out: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
        for (i, m) in self.members.iter().enumerate() {
            if let Membership::Assigned(id) = m {
                out.entry(*id).or_default().push(i);
            }
        }
        out
    }

    pub fn unassigned(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == Membership::Unassigned)
            .map(|(i, _)| i)
            .collect()
    }

    /// Attach every unassigned index to the cluster of its most similar
    /// assigned index when that similarity exceeds `threshold`.
    ///
    /// Candidates come from `self` only, so a reassigned point never pulls
    /// in another one. Highest similarity wins, then the lowest index.
    pub fn reassign_noise(&self, sim: &SimilarityMatrix, threshold: f64) -> Partition {
        let anchors: Vec<(usize, ClusterId)> = self
            .members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.cluster().map(|id| (i, id)))
            .collect();

        let mut moved = 0usize;
        let members = self
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if *m != Membership::Unassigned {
                    return *m;
                }
                let mut best: Option<(f64, ClusterId)> = None;
                for &(j, id) in &anchors {
                    let s = sim.similarity(i, j);
                    if best.map_or(true, |(b, _)| s > b) {
                        best = Some((s, id));
                    }
                }
                match best {
                    Some((s, id)) if s > threshold => {
                        moved += 1;
                        Membership::Assigned(id)
                    }
                    _ => Membership::Unassigned,
                }
            })
            .collect();
        debug!(moved, threshold, "noise reassignment");
        Partition { members }
    }

    /// Re-cluster every cluster larger than the size threshold with the
    /// strict radius.
    ///
    /// A successful split gives each sub-cluster a fresh id, in sub-cluster
    /// order; sub-cluster noise keeps the parent id. A cluster that does not
    /// split is kept or chunked according to `oversize_policy`.
    pub fn split_oversized(&self, observations: &Array2<f64>, config: &ClusterConfig) -> Partition {
        let threshold = config.size_threshold(self.len());
        let mut members = self.members.clone();
        let mut fresh = self.next_id();

        for (parent, indices) in self.clusters() {
            if indices.len() <= threshold {
                continue;
            }
            let sub = dbscan(
                &select_rows(observations, &indices),
                config.split_epsilon,
                config.split_min_samples,
            );
            let groups = cluster_count(&sub);

            if groups > 1 {
                let ids: Vec<ClusterId> = (0..groups)
                    .map(|_| {
                        let id = fresh;
                        fresh = ClusterId(fresh.0 + 1);
                        id
                    })
                    .collect();
                for (&index, label) in indices.iter().zip(&sub) {
                    if let Some(k) = label {
                        members[index] = Membership::Assigned(ids[*k]);
                    }
                }
                debug!(cluster = %parent, size = indices.len(), groups, "split oversized cluster");
                continue;
            }

            match config.oversize_policy {
                OversizePolicy::Keep => {
                    warn!(cluster = %parent, size = indices.len(), threshold, "oversized cluster could not be split, kept intact");
                }
                OversizePolicy::Chunk => {
                    for chunk in indices.chunks(threshold.max(1)).skip(1) {
                        let id = fresh;
                        fresh = ClusterId(fresh.0 + 1);
                        for &index in chunk {
                            members[index] = Membership::Assigned(id);
                        }
                    }
                    debug!(cluster = %parent, size = indices.len(), threshold, "oversized cluster chunked");
                }
            }
        }
        Partition { members }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::dbscan::observations;

    fn at_degrees(degrees: &[f64]) -> Vec<Vec<f32>> {
        degrees
            .iter()
            .map(|d| {
                let r = d.to_radians();
                vec![r.cos() as f32, r.sin() as f32]
            })
            .collect()
    }

    fn assigned(ids: &[u32]) -> Vec<Membership> {
        ids.iter().map(|&i| Membership::Assigned(ClusterId(i))).collect()
    }

    #[test]
    fn labels_map_to_memberships() {
        let p = Partition::from_labels(&[Some(0), None, Some(1), Some(0)]);
        assert_eq!(p.membership(1), Membership::Unassigned);
        assert_eq!(p.next_id(), ClusterId(2));
        assert_eq!(p.unassigned(), vec![1]);
        let clusters = p.clusters();
        assert_eq!(clusters[&ClusterId(0)], vec![0, 3]);
        assert_eq!(clusters[&ClusterId(1)], vec![2]);
        assert_eq!(Partition::from_labels(&[None]).next_id(), ClusterId(0));
    }

    #[test]
    fn noise_joins_close_cluster_only() {
        let sim = SimilarityMatrix::from_vectors(&at_degrees(&[0.0, 5.0, 40.0, -60.0]));
        let base = Partition::from_labels(&[Some(0), Some(0), None, None]);
        let next = base.reassign_noise(&sim, 0.65);
        assert_eq!(next.membership(2), Membership::Assigned(ClusterId(0)));
        assert_eq!(next.membership(3), Membership::Unassigned);
        // input untouched
        assert_eq!(base.membership(2), Membership::Unassigned);
    }

    #[test]
    fn reassignment_tie_goes_to_lowest_index() {
        let sim = SimilarityMatrix::from_vectors(&at_degrees(&[-40.0, -40.0, 40.0, 40.0, 0.0]));
        let base = Partition::from_labels(&[Some(1), Some(1), Some(0), Some(0), None]);
        let next = base.reassign_noise(&sim, 0.65);
        assert_eq!(next.membership(4), Membership::Assigned(ClusterId(1)));
    }

    #[test]
    fn reassigned_points_do_not_chain() {
        // 2 is close to cluster 0; 3 is close to 2 only
        let sim = SimilarityMatrix::from_vectors(&at_degrees(&[0.0, 0.0, 40.0, 80.0]));
        let base = Partition::from_labels(&[Some(0), Some(0), None, None]);
        let next = base.reassign_noise(&sim, 0.65);
        assert_eq!(next.membership(2), Membership::Assigned(ClusterId(0)));
        assert_eq!(next.membership(3), Membership::Unassigned);
    }

    #[test]
    fn oversized_cluster_splits_into_fresh_ids() {
        let obs = observations(&at_degrees(&[0.0, 1.0, 2.0, 3.0, 42.0, 43.0, 44.0, 45.0, 90.0]));
        let mut members = assigned(&[0, 0, 0, 0, 0, 0, 0, 0]);
        members.push(Membership::Unassigned);
        let base = Partition::from_members(members);
        let next = base.split_oversized(&obs, &ClusterConfig::default());
        let clusters = next.clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[&ClusterId(1)], vec![0, 1, 2, 3]);
        assert_eq!(clusters[&ClusterId(2)], vec![4, 5, 6, 7]);
        assert_eq!(next.membership(8), Membership::Unassigned);
    }

    #[test]
    fn sub_noise_keeps_parent_label() {
        let obs = observations(&at_degrees(&[0.0, 1.0, 2.0, 42.0, 43.0, 44.0, 89.0]));
        let base = Partition::from_members(assigned(&[0, 0, 0, 0, 0, 0, 0]));
        let next = base.split_oversized(&obs, &ClusterConfig::default());
        let clusters = next.clusters();
        assert_eq!(clusters[&ClusterId(0)], vec![6]);
        assert_eq!(clusters[&ClusterId(1)], vec![0, 1, 2]);
        assert_eq!(clusters[&ClusterId(2)], vec![3, 4, 5]);
    }

    #[test]
    fn unsplittable_cluster_is_kept_or_chunked() {
        let obs = observations(&at_degrees(&[0.0; 8]));
        let base = Partition::from_members(assigned(&[3; 8]));

        let kept = base.split_oversized(&obs, &ClusterConfig::default());
        assert_eq!(kept, base);

        let config = ClusterConfig { oversize_policy: OversizePolicy::Chunk, ..ClusterConfig::default() };
        let chunked = base.split_oversized(&obs, &config).clusters();
        assert_eq!(chunked[&ClusterId(3)], vec![0, 1, 2, 3, 4]);
        assert_eq!(chunked[&ClusterId(4)], vec![5, 6, 7]);
    }

    #[test]
    fn small_clusters_are_left_alone() {
        let obs = observations(&at_degrees(&[0.0, 60.0, 0.0, 60.0]));
        let base = Partition::from_members(assigned(&[0, 0, 1, 1]));
        assert_eq!(base.split_oversized(&obs, &ClusterConfig::default()), base);
    }
}
