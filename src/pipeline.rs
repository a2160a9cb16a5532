//! Batch orchestration: reviews → phrases → vectors → clusters → records,
//! then sentiment and summary for the full batch report.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::aggregate::{aggregate, PhraseReviews};
use crate::cluster::ClusterEngine;
use crate::config::EngineConfig;
use crate::error::{InputError, Result};
use crate::extract::{cleaner::TextCleaner, tagger::LexiconTagger, tagger::PosTagger, PhraseExtractor};
use crate::report::{AspectReport, BatchReport, PhraseStat};
use crate::sentiment::{tag_sentiment, LexiconSentimentScorer, SentimentScorer};
use crate::summary::{Summarizer, TextGenerator, NO_REVIEWS_SUMMARY};
use crate::utils::math::round_to;
use crate::vectorizer::{sentence::HashingSentenceEmbedder, sentence::SentenceEmbedder, Vectorizer};

/// Phrase occurrences of one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseTable {
    /// every extracted phrase, review by review, repeats kept
    pub phrases: Vec<String>,
    pub phrase_reviews: PhraseReviews,
}

impl PhraseTable {
    fn push(&mut self, review: usize, phrase: String) {
        self.phrase_reviews
            .entry(phrase.clone())
            .or_insert_with(BTreeSet::new)
            .insert(review);
        self.phrases.push(phrase);
    }
}

/// Builder for `ReviewAnalyzer`. Unset collaborators get the built-in defaults.
pub struct ReviewAnalyzerBuilder {
    config: EngineConfig,
    tagger: Option<Arc<dyn PosTagger>>,
    embedder: Option<Arc<dyn SentenceEmbedder>>,
    sentiment: Option<Arc<dyn SentimentScorer>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ReviewAnalyzerBuilder {
    pub fn tagger(mut self, tagger: Arc<dyn PosTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn SentenceEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn sentiment(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.sentiment = Some(scorer);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> Result<ReviewAnalyzer> {
        self.config.validate()?;
        let config = self.config;
        let tagger = self.tagger.unwrap_or_else(|| Arc::new(LexiconTagger::default()));
        let embedder = self.embedder.unwrap_or_else(|| Arc::new(HashingSentenceEmbedder::default()));
        let sentiment = match self.sentiment {
            Some(scorer) => scorer,
            None => Arc::new(LexiconSentimentScorer::builtin()?),
        };
        Ok(ReviewAnalyzer {
            cleaner: TextCleaner::new(config.extractor.lowercase)?,
            extractor: PhraseExtractor::new(tagger.clone(), config.extractor.clone())?,
            vectorizer: Vectorizer::new(tagger, embedder, config.vectorizer.clone()),
            engine: ClusterEngine::new(config.cluster.clone()),
            sentiment,
            summarizer: Summarizer::new(self.generator, config.summary.clone()),
            config,
        })
    }
}

/// Review batch analyzer.
///
/// Collaborators are built once and shared read-only; every call works on
/// its own request-scoped state, so one analyzer can serve concurrent batches.
pub struct ReviewAnalyzer {
    cleaner: TextCleaner,
    extractor: PhraseExtractor,
    vectorizer: Vectorizer,
    engine: ClusterEngine,
    sentiment: Arc<dyn SentimentScorer>,
    summarizer: Summarizer,
    config: EngineConfig,
}

impl ReviewAnalyzer {
    pub fn builder(config: EngineConfig) -> ReviewAnalyzerBuilder {
        ReviewAnalyzerBuilder { config, tagger: None, embedder: None, sentiment: None, generator: None }
    }

    /// Analyzer with every built-in collaborator and no text generator
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract the phrases of every review.
    ///
    /// A review whose extraction fails contributes nothing. When no review
    /// yields anything, each review contributes its truncated raw text (or
    /// the placeholder when empty) instead.
    pub fn extract_phrases(&self, reviews: &[String]) -> PhraseTable {
        let per_review: Vec<Vec<String>> = reviews
            .par_iter()
            .enumerate()
            .map(|(i, review)| {
                let cleaned = self.cleaner.clean(review);
                match self.extractor.extract_key_phrases(&cleaned) {
                    Ok(phrases) => phrases.into_iter().collect(),
                    Err(e) => {
                        warn!(review = i, error = %e, "phrase extraction failed, review skipped");
                        Vec::new()
                    }
                }
            })
            .collect();

        let mut table = PhraseTable::default();
        if per_review.iter().all(Vec::is_empty) {
            warn!(reviews = reviews.len(), "no phrases extracted, using raw review text");
            for (i, review) in reviews.iter().enumerate() {
                table.push(i, self.extractor.emergency_phrase(review));
            }
            return table;
        }
        for (i, phrases) in per_review.into_iter().enumerate() {
            for phrase in phrases {
                table.push(i, phrase);
            }
        }
        table
    }

    /// Core pipeline: representative records plus the batch size
    pub fn cluster_reviews(&self, reviews: &[String]) -> AspectReport {
        let total = reviews.len();
        if total == 0 {
            return AspectReport::default();
        }

        let started = Instant::now();
        let table = self.extract_phrases(reviews);
        let extracted = started.elapsed();

        let vectorized = self.vectorizer.vectorize(&table.phrases);
        let vectorized_at = started.elapsed();

        let assignment = self.engine.cluster(&table.phrases, &vectorized.vectors);
        let clustered_at = started.elapsed();

        let records = aggregate(&assignment, &table.phrases, &table.phrase_reviews);
        info!(
            reviews = total,
            phrases = table.phrases.len(),
            distinct = table.phrase_reviews.len(),
            records = records.len(),
            extract_ms = extracted.as_millis() as u64,
            vectorize_ms = (vectorized_at - extracted).as_millis() as u64,
            cluster_ms = (clustered_at - vectorized_at).as_millis() as u64,
            "batch clustered"
        );
        AspectReport::new(records, total)
    }

    /// Full report: clustered aspects with sentiment, plus a prose summary
    pub fn analyze_batch(&self, reviews: &[String]) -> BatchReport {
        if reviews.is_empty() {
            return BatchReport { summary: NO_REVIEWS_SUMMARY.to_string(), phrase_stats: Vec::new(), total_reviews: 0 };
        }
        let report = self.cluster_reviews(reviews);
        let cap = self.config.summary.similar_phrases_cap;
        let phrase_stats: Vec<PhraseStat> = report
            .records
            .par_iter()
            .map(|record| {
                let score = tag_sentiment(self.sentiment.as_ref(), &record.representative);
                PhraseStat {
                    phrase: record.representative.clone(),
                    count: record.coverage,
                    percentage: record.percentage,
                    sentiment: score.label,
                    confidence: round_to(score.confidence, 2),
                    similar_phrases: record.members.iter().take(cap).cloned().collect(),
                }
            })
            .collect();
        let summary = self.summarizer.summarize(&phrase_stats, report.total_reviews);
        BatchReport { summary, phrase_stats, total_reviews: report.total_reviews }
    }
}

/// Parse a batch given as a JSON array of strings.
/// Anything else is rejected before reaching the pipeline.
pub fn parse_review_batch(json: &str) -> std::result::Result<Vec<String>, InputError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| InputError::NotAList { reason: e.to_string() })?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => return Err(InputError::NotAList { reason: format!("found {}", json_kind(&other)) }),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::String(text) => Ok(text),
            _ => Err(InputError::NotText { index }),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
