use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SentimentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// in [0, 1]
    pub confidence: f64,
}

impl SentimentScore {
    /// Default for a failed scorer
    pub const UNKNOWN: SentimentScore = SentimentScore { label: SentimentLabel::Unknown, confidence: 0.5 };

    /// Map a positive-class probability to a label.
    /// p > 0.6 positive, p < 0.4 negative, neutral in between.
    pub fn from_positive_probability(p: f64) -> Self {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.5 };
        if p > 0.6 {
            Self { label: SentimentLabel::Positive, confidence: p }
        } else if p < 0.4 {
            Self { label: SentimentLabel::Negative, confidence: 1.0 - p }
        } else {
            Self { label: SentimentLabel::Neutral, confidence: p.max(1.0 - p) }
        }
    }
}

/// Sentiment-classification collaborator
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<SentimentScore, SentimentError>;
}

/// Score `text`, degrading any failure to `SentimentScore::UNKNOWN`
pub fn tag_sentiment(scorer: &dyn SentimentScorer, text: &str) -> SentimentScore {
    match scorer.score(text) {
        Ok(score) => score,
        Err(e) => {
            warn!(phrase = %text, error = %e, "sentiment scoring failed, using unknown");
            SentimentScore::UNKNOWN
        }
    }
}

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "nice", "fresh", "delicious", "tasty", "attentive",
    "friendly", "clean", "cheap", "reasonable", "cozy", "amazing", "wonderful", "perfect",
    "lovely", "best", "happy", "satisfied", "fast", "quiet", "comfortable", "worth",
    "好", "棒", "赞", "香", "美味", "新鲜", "便宜", "实惠", "热情", "满意", "好吃", "干净",
    "舒适", "安静", "快", "不错", "便利", "好找",
];
const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "poor", "slow", "rude", "dirty", "expensive", "noisy",
    "bland", "disappointing", "disappointed", "cold", "horrible", "worst", "crowded",
    "overpriced",
    "差", "糟", "烂", "难吃", "贵", "慢", "久", "嘈杂", "失望",
];
const NEGATORS: &[&str] = &["not", "never", "no", "hardly", "不", "没", "没有", "别"];

/// bytes a negator may sit before the cue it flips
const NEGATION_REACH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Positive,
    Negative,
    Negator,
}

/// Cue-word counting scorer.
///
/// Positive probability = positive hits / all hits (0.5 without hits). A
/// negator shortly before a cue flips it. ASCII cues only count on word
/// boundaries.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    matcher: AhoCorasick,
    cues: Vec<(Cue, bool)>,
}

impl LexiconSentimentScorer {
    pub fn builtin() -> Result<Self, SentimentError> {
        Self::from_words(POSITIVE, NEGATIVE, NEGATORS)
    }

    pub fn from_words(positive: &[&str], negative: &[&str], negators: &[&str]) -> Result<Self, SentimentError> {
        let mut patterns: Vec<&str> = Vec::new();
        let mut cues = Vec::new();
        for (words, cue) in [(positive, Cue::Positive), (negative, Cue::Negative), (negators, Cue::Negator)] {
            for &word in words {
                patterns.push(word);
                cues.push((cue, word.is_ascii()));
            }
        }
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| SentimentError::Failed { reason: format!("failed to build cue matcher: {e}") })?;
        Ok(Self { matcher, cues })
    }

    /// Positive-class probability of `text`
    pub fn positive_probability(&self, text: &str) -> f64 {
        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut negate_until: Option<usize> = None;
        for m in self.matcher.find_iter(text) {
            let (cue, ascii) = self.cues[m.pattern().as_usize()];
            if ascii && !on_word_boundary(text, m.start(), m.end()) {
                continue;
            }
            if cue == Cue::Negator {
                negate_until = Some(m.end() + NEGATION_REACH);
                continue;
            }
            let negated = negate_until.is_some_and(|end| m.start() <= end);
            negate_until = None;
            match (cue, negated) {
                (Cue::Positive, false) | (Cue::Negative, true) => positive += 1,
                _ => negative += 1,
            }
        }
        let total = positive + negative;
        if total == 0 {
            0.5
        } else {
            positive as f64 / total as f64
        }
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn score(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        if text.trim().is_empty() {
            return Err(SentimentError::Failed { reason: "empty text".to_string() });
        }
        Ok(SentimentScore::from_positive_probability(self.positive_probability(text)))
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric()) && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}
