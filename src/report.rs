use serde::{Deserialize, Serialize};

use crate::aggregate::RepresentativePhraseRecord;
use crate::sentiment::SentimentLabel;

/// Core handoff payload: ordered records plus the batch size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectReport {
    pub records: Vec<RepresentativePhraseRecord>,
    pub total_reviews: usize,
}

impl AspectReport {
    /// Fills each record's percentage from `total_reviews`
    pub fn new(mut records: Vec<RepresentativePhraseRecord>, total_reviews: usize) -> Self {
        for record in &mut records {
            record.percentage = record.percentage_of(total_reviews);
        }
        Self { records, total_reviews }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One sentiment-tagged aspect line of a batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseStat {
    pub phrase: String,
    /// distinct reviews covered
    pub count: usize,
    pub percentage: f64,
    pub sentiment: SentimentLabel,
    /// rounded to 2 decimals
    pub confidence: f64,
    pub similar_phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: String,
    pub phrase_stats: Vec<PhraseStat>,
    pub total_reviews: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_percentages() {
        let record = RepresentativePhraseRecord {
            representative: "service slow".into(),
            members: vec!["service slow".into()],
            coverage: 2,
            percentage: 0.0,
        };
        let report = AspectReport::new(vec![record], 3);
        assert_eq!(report.records[0].percentage, 66.7);
        assert!(!report.is_empty());
    }

    #[test]
    fn batch_report_serializes_with_lowercase_labels() {
        let report = BatchReport {
            summary: "ok".into(),
            phrase_stats: vec![PhraseStat {
                phrase: "service slow".into(),
                count: 1,
                percentage: 50.0,
                sentiment: SentimentLabel::Negative,
                confidence: 1.0,
                similar_phrases: vec!["service slow".into()],
            }],
            total_reviews: 2,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["phrase_stats"][0]["sentiment"], "negative");
        assert_eq!(json["total_reviews"], 2);
    }
}
