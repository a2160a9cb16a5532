use std::path::PathBuf;

/// Tokenizer / part-of-speech collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    #[error("tagging failed: {reason}")]
    Failed { reason: String },

    #[error("user dictionary {path} unreadable: {source}")]
    UserDict {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sentence-embedding collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding backend failed: {reason}")]
    Backend { reason: String },

    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch { index: usize, expected: usize, actual: usize },
}

/// Sentiment collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("sentiment scoring failed: {reason}")]
    Failed { reason: String },
}

/// Text-generation collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned status {status}")]
    Status { status: u16 },

    #[error("malformed generation response: {reason}")]
    Malformed { reason: String },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {path} unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Batch boundary errors. The only fatal input condition.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("review batch must be a JSON array of strings: {reason}")]
    NotAList { reason: String },

    #[error("review batch element {index} is not a string")]
    NotText { index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid phrase pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Tagger(#[from] TaggerError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cbor error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
