use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
/// Every section falls back to its defaults when omitted from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub extractor: ExtractorConfig,
    pub vectorizer: VectorizerConfig,
    pub cluster: ClusterConfig,
    pub summary: SummaryConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor.validate()?;
        self.vectorizer.validate()?;
        self.cluster.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Phrases shorter than this (in chars) are dropped.
    pub min_phrase_chars: usize,
    /// Length of the raw-text fallback phrase.
    pub fallback_chars: usize,
    /// Emitted by the batch emergency fallback for an empty review.
    pub empty_placeholder: String,
    /// Lowercase ASCII letters while cleaning.
    pub lowercase: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_phrase_chars: 2,
            fallback_chars: 20,
            empty_placeholder: "(empty review)".to_string(),
            lowercase: true,
        }
    }
}

impl ExtractorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_chars == 0 {
            return Err(invalid("extractor.fallback_chars", "must be at least 1"));
        }
        if self.empty_placeholder.trim().is_empty() {
            return Err(invalid("extractor.empty_placeholder", "must not be blank"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Below this many phrases the sentence embedder is used.
    pub small_input_threshold: usize,
    /// Dimension of the request-scoped word embedding.
    pub word_dim: usize,
    /// Context window (tokens on each side) used while training.
    pub window: usize,
    /// Share of the averaged context vector mixed into a word vector.
    pub context_weight: f64,
    pub seed: u64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            small_input_threshold: 5,
            word_dim: 100,
            window: 2,
            context_weight: 0.5,
            seed: 0x5EED_A5BE,
        }
    }
}

impl VectorizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.word_dim == 0 {
            return Err(invalid("vectorizer.word_dim", "must be at least 1"));
        }
        if !self.context_weight.is_finite() || self.context_weight < 0.0 {
            return Err(invalid("vectorizer.context_weight", "must be a non-negative number"));
        }
        Ok(())
    }
}

/// How the base clustering radius is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EpsilonStrategy {
    /// Fixed cosine distance radius.
    Fixed(f64),
    /// 1 - quantile of pairwise similarities, clamped into [min, max].
    Quantile { quantile: f64, min: f64, max: f64 },
}

/// What happens to an oversized cluster the strict pass cannot split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    Keep,
    Chunk,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    pub epsilon: EpsilonStrategy,
    pub min_samples: usize,
    /// Noise joins its nearest clustered phrase above this similarity.
    pub reassign_threshold: f64,
    /// size threshold = max(count / size_divisor, size_floor)
    pub size_divisor: usize,
    pub size_floor: usize,
    pub split_epsilon: f64,
    pub split_min_samples: usize,
    pub oversize_policy: OversizePolicy,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            epsilon: EpsilonStrategy::Fixed(0.35),
            min_samples: 2,
            reassign_threshold: 0.65,
            size_divisor: 10,
            size_floor: 5,
            split_epsilon: 0.2,
            split_min_samples: 2,
            oversize_policy: OversizePolicy::Keep,
        }
    }
}

impl ClusterConfig {
    pub fn size_threshold(&self, phrase_count: usize) -> usize {
        (phrase_count / self.size_divisor.max(1)).max(self.size_floor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.epsilon {
            EpsilonStrategy::Fixed(eps) => check_radius("cluster.epsilon", eps)?,
            EpsilonStrategy::Quantile { quantile, min, max } => {
                check_unit("cluster.epsilon.quantile", quantile)?;
                check_radius("cluster.epsilon.min", min)?;
                check_radius("cluster.epsilon.max", max)?;
                if min > max {
                    return Err(invalid("cluster.epsilon", "min must not exceed max"));
                }
            }
        }
        check_unit("cluster.reassign_threshold", self.reassign_threshold)?;
        check_radius("cluster.split_epsilon", self.split_epsilon)?;
        if self.min_samples < 2 {
            return Err(invalid("cluster.min_samples", "must be at least 2"));
        }
        if self.split_min_samples < 2 {
            return Err(invalid("cluster.split_min_samples", "must be at least 2"));
        }
        if self.size_divisor == 0 {
            return Err(invalid("cluster.size_divisor", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_positive: usize,
    pub max_negative: usize,
    pub max_neutral: usize,
    pub similar_phrases_cap: usize,
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_positive: 5,
            max_negative: 5,
            max_neutral: 3,
            similar_phrases_cap: 5,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:latest".to_string(),
            temperature: 0.5,
            max_tokens: 600,
            timeout_secs: 60,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, "must lie in [0, 1]"));
    }
    Ok(())
}

fn check_radius(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(field, "must lie in (0, 1]"));
    }
    Ok(())
}
