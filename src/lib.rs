/// This crate is a review aspect-phrase clustering engine.
pub mod aggregate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod summary;
pub mod utils;
pub mod vectorizer;

/// Review Analyzer
/// The top-level struct of this crate. It turns a batch of free-text reviews
/// into representative aspect phrases with counts, percentages, sentiment
/// and a prose summary.
///
/// Internally, it holds:
/// - A text cleaner and a phrase extractor (part-of-speech rules + regex patterns)
/// - A vectorizer (sentence embedder for small inputs, request-scoped word embedding otherwise)
/// - A density-based cluster engine
/// - A sentiment scorer and a summarizer
///
/// Collaborators are injected through `ReviewAnalyzer::builder`; anything not
/// given falls back to a built-in, model-free default.
///
/// # Thread Safety
/// Built once, shared read-only. All batch state is request-scoped, so one
/// analyzer can serve concurrent batches.
pub use pipeline::{parse_review_batch, ReviewAnalyzer, ReviewAnalyzerBuilder};

/// Engine configuration
/// Every threshold of the pipeline, loadable from TOML with defaults for
/// anything omitted.
pub use config::{ClusterConfig, EngineConfig, EpsilonStrategy, ExtractorConfig, OversizePolicy, SummaryConfig, VectorizerConfig};

/// Report structures
/// - `AspectReport`: ordered representative records plus the batch size
/// - `BatchReport`: sentiment-tagged phrase stats plus a summary
pub use report::{AspectReport, BatchReport, PhraseStat};

/// Representative Phrase Record
/// One final cluster: display phrase, member variants, distinct-review
/// coverage and percentage of the batch.
pub use aggregate::RepresentativePhraseRecord;

/// Cluster Engine
/// Groups phrase vectors by cosine similarity.
/// Base density clustering, noise reassignment and oversized-cluster
/// splitting run as pure transforms, so the same vectors always give the
/// same partition.
///
/// # Memory
/// The similarity matrix is O(n²) in the phrase count. Callers must cap the
/// batch size to keep this tractable.
pub use cluster::{ClusterAssignment, ClusterEngine};

/// Phrase Extractor
/// Turns one cleaned review into a set of short candidate phrases.
pub use extract::PhraseExtractor;

/// Collaborator traits
/// Plug different tagging / embedding / sentiment / generation backends
/// into the analyzer.
pub use extract::tagger::PosTagger;
pub use sentiment::SentimentScorer;
pub use summary::TextGenerator;
pub use vectorizer::sentence::SentenceEmbedder;

/// Sentiment label and score
pub use sentiment::{SentimentLabel, SentimentScore};

pub use error::{Error, Result};
