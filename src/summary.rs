use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SummaryConfig;
use crate::error::GenerationError;
use crate::report::PhraseStat;
use crate::sentiment::SentimentLabel;

pub const NO_REVIEWS_SUMMARY: &str = "No reviews to analyze.";
pub const NO_ASPECTS_SUMMARY: &str = "No distinct aspects could be extracted from the reviews.";

/// Text-generation collaborator
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Ollama `/api/generate` client (blocking).
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(config: &SummaryConfig) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/api/generate", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self.client.post(&self.url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status { status: status.as_u16() });
        }
        let body: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::Malformed { reason: e.to_string() })?;
        parse_generated(body.response)
    }
}

fn parse_generated(response: Option<String>) -> Result<String, GenerationError> {
    match response {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => Err(GenerationError::Malformed { reason: "empty response".to_string() }),
        None => Err(GenerationError::Malformed { reason: "missing response field".to_string() }),
    }
}

/// Builds the prose summary of a batch.
/// Without a generator, or when it fails, a templated summary is returned.
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    config: SummaryConfig,
}

impl Summarizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: SummaryConfig) -> Self {
        Self { generator, config }
    }

    pub fn summarize(&self, stats: &[PhraseStat], total_reviews: usize) -> String {
        if total_reviews == 0 {
            return NO_REVIEWS_SUMMARY.to_string();
        }
        let Some(generator) = &self.generator else {
            return template_summary(stats, total_reviews, &self.config);
        };
        let prompt = build_prompt(stats, total_reviews, &self.config);
        match generator.generate(&prompt) {
            Ok(text) => {
                debug!(chars = text.chars().count(), "generated summary");
                text
            }
            Err(e) => {
                warn!(error = %e, "summary generation failed, using template");
                template_summary(stats, total_reviews, &self.config)
            }
        }
    }
}

/// (positive, negative, neutral) stats, each capped. Unknown counts as neutral.
fn partition_by_sentiment<'a>(
    stats: &'a [PhraseStat],
    config: &SummaryConfig,
) -> (Vec<&'a PhraseStat>, Vec<&'a PhraseStat>, Vec<&'a PhraseStat>) {
    let pick = |wanted: &[SentimentLabel], cap: usize| -> Vec<&'a PhraseStat> {
        stats.iter().filter(|s| wanted.contains(&s.sentiment)).take(cap).collect()
    };
    (
        pick(&[SentimentLabel::Positive], config.max_positive),
        pick(&[SentimentLabel::Negative], config.max_negative),
        pick(&[SentimentLabel::Neutral, SentimentLabel::Unknown], config.max_neutral),
    )
}

fn phrase_line(stat: &PhraseStat) -> String {
    format!("{} ({}%, {} reviews)", stat.phrase, stat.percentage, stat.count)
}

pub fn build_prompt(stats: &[PhraseStat], total_reviews: usize, config: &SummaryConfig) -> String {
    let (positive, negative, neutral) = partition_by_sentiment(stats, config);
    let mut prompt = String::from(
        "Write a comprehensive and objective summary of this restaurant based on the review data below.\n\n",
    );
    let _ = write!(prompt, "Total reviews: {total_reviews}\n\n");
    for (title, section) in [("Positive", &positive), ("Negative", &negative), ("Neutral", &neutral)] {
        if section.is_empty() {
            continue;
        }
        let _ = writeln!(prompt, "{title}:");
        for stat in section.iter() {
            let _ = writeln!(prompt, "- {}", phrase_line(stat));
        }
        prompt.push('\n');
    }
    prompt.push_str(
        "Write a concise, balanced summary under 300 words that highlights the main strengths and weaknesses, \
         giving positive and negative points space in proportion to the data.",
    );
    prompt
}

/// Summary assembled from the stats alone
pub fn template_summary(stats: &[PhraseStat], total_reviews: usize, config: &SummaryConfig) -> String {
    if total_reviews == 0 {
        return NO_REVIEWS_SUMMARY.to_string();
    }
    if stats.is_empty() {
        return NO_ASPECTS_SUMMARY.to_string();
    }
    let (positive, negative, neutral) = partition_by_sentiment(stats, config);
    let list = |items: &[&PhraseStat]| items.iter().map(|s| phrase_line(s)).collect::<Vec<_>>().join(", ");

    let mut out = format!("Based on {total_reviews} reviews.");
    if !positive.is_empty() {
        let _ = write!(out, " Customers praised {}.", list(&positive));
    }
    if !negative.is_empty() {
        let _ = write!(out, " Complaints mentioned {}.", list(&negative));
    }
    if !neutral.is_empty() {
        let _ = write!(out, " Also mentioned: {}.", list(&neutral));
    }
    out
}
