pub mod corpus;
pub mod sentence;
pub mod term;
pub mod tfidf;
pub mod word_embedding;

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::VectorizerConfig;
use crate::error::EmbeddingError;
use crate::extract::tagger::PosTagger;
use crate::vectorizer::{
    corpus::Corpus,
    sentence::SentenceEmbedder,
    term::TermFrequency,
    tfidf::{DefaultTermWeightEngine, TermWeightEngine, TermWeights},
    word_embedding::WordEmbedding,
};

/// Output of `Vectorizer::vectorize`.
/// `vectors`, `tokenized` and the input phrases are parallel sequences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vectorized {
    pub vectors: Vec<Vec<f32>>,
    pub tokenized: Vec<Vec<String>>,
}

impl Vectorized {
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Which embedding path produced a batch of vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingPath {
    Sentence,
    LocalWords,
}

/// Phrase → vector mapping.
///
/// Small phrase lists go to the injected `SentenceEmbedder`; larger ones
/// train a request-scoped `WordEmbedding` and average word vectors with
/// corpus term weights. `E` selects the term weighting.
pub struct Vectorizer<E = DefaultTermWeightEngine>
where
    E: TermWeightEngine,
{
    tagger: Arc<dyn PosTagger>,
    embedder: Arc<dyn SentenceEmbedder>,
    config: VectorizerConfig,
    _marker: std::marker::PhantomData<fn() -> E>,
}

impl<E> Vectorizer<E>
where
    E: TermWeightEngine,
{
    pub fn new(tagger: Arc<dyn PosTagger>, embedder: Arc<dyn SentenceEmbedder>, config: VectorizerConfig) -> Self {
        Self { tagger, embedder, config, _marker: std::marker::PhantomData }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Path a list of `phrase_count` phrases will take
    #[inline]
    pub fn path_for(&self, phrase_count: usize) -> EmbeddingPath {
        if phrase_count < self.config.small_input_threshold {
            EmbeddingPath::Sentence
        } else {
            EmbeddingPath::LocalWords
        }
    }

    /// Vectorize phrases.
    /// Never fails: collaborator errors degrade to the local path, degenerate
    /// weights to an unweighted mean or the zero vector.
    pub fn vectorize(&self, phrases: &[String]) -> Vectorized {
        let tokenized = self.tokenize_all(phrases);
        if phrases.is_empty() {
            return Vectorized::default();
        }

        let vectors = match self.path_for(phrases.len()) {
            EmbeddingPath::Sentence => match self.embed_sentences(phrases) {
                Ok(vectors) => vectors,
                Err(e) => {
                    warn!(error = %e, "sentence embedding failed, using local word embedding");
                    self.embed_words(&tokenized)
                }
            },
            EmbeddingPath::LocalWords => self.embed_words(&tokenized),
        };
        Vectorized { vectors, tokenized }
    }

    /// Lowercased word tokens of each phrase, punctuation dropped
    pub fn tokenize_all(&self, phrases: &[String]) -> Vec<Vec<String>> {
        phrases
            .par_iter()
            .map(|phrase| match self.tagger.tag(phrase) {
                Ok(tokens) => tokens
                    .into_iter()
                    .filter(|t| !t.is_punctuation() && !t.text.trim().is_empty())
                    .map(|t| t.text.to_lowercase())
                    .collect(),
                Err(e) => {
                    warn!(phrase = %phrase, error = %e, "tokenization failed, phrase gets the zero vector");
                    Vec::new()
                }
            })
            .collect()
    }

    fn embed_sentences(&self, phrases: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let vectors = self.embedder.embed(phrases)?;
        if vectors.len() != phrases.len() {
            return Err(EmbeddingError::CountMismatch { expected: phrases.len(), actual: vectors.len() });
        }
        let expected = self.embedder.dimensions();
        if let Some((index, vector)) = vectors.iter().enumerate().find(|(_, v)| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch { index, expected, actual: vector.len() });
        }
        debug!(phrases = phrases.len(), dims = self.embedder.dimensions(), "sentence embedding");
        Ok(vectors)
    }

    fn embed_words(&self, tokenized: &[Vec<String>]) -> Vec<Vec<f32>> {
        let model = WordEmbedding::train(tokenized, &self.config);
        let corpus = Corpus::from_documents(tokenized);
        let mut freq = TermFrequency::new();
        for tokens in tokenized {
            freq.add_terms(tokens);
        }
        let weights = E::term_weights(&freq, &corpus);
        debug!(vocab = model.len(), docs = corpus.get_doc_num(), "local word embedding trained");

        tokenized
            .par_iter()
            .map(|tokens| phrase_vector(tokens, &model, &weights))
            .collect()
    }
}

/// Weighted average of word vectors.
/// Unseen words weigh 1.0; a zero weight sum falls back to the plain mean;
/// no known tokens gives the zero vector.
fn phrase_vector(tokens: &[String], model: &WordEmbedding, weights: &TermWeights) -> Vec<f32> {
    let dim = model.dim();
    let known: Vec<(&[f64], f64)> = tokens
        .iter()
        .filter_map(|t| model.get(t).map(|v| (v, weights.get(t).copied().unwrap_or(1.0))))
        .collect();
    if known.is_empty() {
        return vec![0.0; dim];
    }

    let weight_sum: f64 = known.iter().map(|(_, w)| w).sum();
    let (scale, use_weights) = if weight_sum.abs() > f64::EPSILON {
        (1.0 / weight_sum, true)
    } else {
        (1.0 / known.len() as f64, false)
    };

    let mut acc = vec![0.0f64; dim];
    for (vector, weight) in &known {
        let w = if use_weights { *weight } else { 1.0 };
        for (a, v) in acc.iter_mut().zip(vector.iter()) {
            *a += w * v;
        }
    }
    acc.into_iter().map(|a| (a * scale) as f32).collect()
}
