use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cluster::ClusterAssignment;
use crate::utils::math::round_to;

/// phrase text → ascending indices of the reviews it was extracted from.
/// Insertion order is the first occurrence of each phrase.
pub type PhraseReviews = IndexMap<String, BTreeSet<usize>>;

/// One final group of similar phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativePhraseRecord {
    /// display text, the member with the widest review coverage
    pub representative: String,
    /// distinct member texts, first-occurrence order
    pub members: Vec<String>,
    /// distinct reviews covered by any member
    pub coverage: usize,
    /// share of the batch, filled once the batch size is known
    #[serde(default)]
    pub percentage: f64,
}

impl RepresentativePhraseRecord {
    /// Percent of `total_reviews` this record covers
    pub fn percentage_of(&self, total_reviews: usize) -> f64 {
        percentage(self.coverage, total_reviews)
    }
}

/// round(coverage / total * 100, 1), 0.0 for an empty batch
#[inline]
pub fn percentage(coverage: usize, total_reviews: usize) -> f64 {
    if total_reviews == 0 {
        return 0.0;
    }
    round_to(coverage as f64 / total_reviews as f64 * 100.0, 1)
}

/// Turn a cluster assignment into ordered representative records.
///
/// Clusters become one record each. Unassigned phrases become singleton
/// records, with identical texts collapsed into one. Records are ordered by
/// coverage (descending), then by first occurrence of the representative.
pub fn aggregate(
    assignment: &ClusterAssignment,
    phrases: &[String],
    phrase_reviews: &PhraseReviews,
) -> Vec<RepresentativePhraseRecord> {
    let mut records: Vec<(usize, RepresentativePhraseRecord)> = assignment
        .clusters
        .values()
        .filter_map(|indices| build_record(indices, phrases, phrase_reviews))
        .collect();

    let mut singletons: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for &index in &assignment.unassigned {
        if let Some(text) = phrases.get(index) {
            singletons.entry(text.as_str()).or_default().push(index);
        }
    }
    records.extend(
        singletons
            .values()
            .filter_map(|indices| build_record(indices, phrases, phrase_reviews)),
    );

    records.sort_by(|(a_first, a), (b_first, b)| b.coverage.cmp(&a.coverage).then(a_first.cmp(b_first)));
    records.into_iter().map(|(_, record)| record).collect()
}

/// Record for one group of phrase indices, paired with the first-occurrence
/// rank of its representative
fn build_record(
    indices: &[usize],
    phrases: &[String],
    phrase_reviews: &PhraseReviews,
) -> Option<(usize, RepresentativePhraseRecord)> {
    let members: IndexSet<&str> = indices
        .iter()
        .filter_map(|&i| phrases.get(i).map(String::as_str))
        .collect();

    let no_reviews = BTreeSet::new();
    let mut covered: BTreeSet<usize> = BTreeSet::new();
    // (coverage, first occurrence, text)
    let mut best: Option<(usize, usize, &str)> = None;
    for &text in &members {
        // an unknown text covers nothing and ranks after every known one
        let (rank, reviews) = match phrase_reviews.get_full(text) {
            Some((rank, _, reviews)) => (rank, reviews),
            None => {
                warn!(phrase = %text, "phrase missing from review map, counted with no reviews");
                (usize::MAX, &no_reviews)
            }
        };
        covered.extend(reviews.iter().copied());
        let better = match best {
            None => true,
            Some((count, first, _)) => reviews.len() > count || (reviews.len() == count && rank < first),
        };
        if better {
            best = Some((reviews.len(), rank, text));
        }
    }
    let (_, rank, representative) = best?;
    Some((
        rank,
        RepresentativePhraseRecord {
            representative: representative.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            coverage: covered.len(),
            percentage: 0.0,
        },
    ))
}
