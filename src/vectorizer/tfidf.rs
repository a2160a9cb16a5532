use indexmap::IndexMap;

use crate::vectorizer::{corpus::Corpus, term::TermFrequency};

/// Per-term weights over one batch vocabulary, first-occurrence order
pub type TermWeights = IndexMap<String, f64>;

pub trait TermWeightEngine {
    /// IDF value for each vocabulary term
    /// # Arguments
    /// * `corpus` - document frequencies of the batch
    /// # Returns
    /// * `IndexMap<String, f64>` - idf per term
    fn idf_map(corpus: &Corpus) -> TermWeights;

    /// Combined corpus-level weight for each term
    /// # Arguments
    /// * `freq` - term occurrence counts over the whole batch
    /// * `corpus` - document frequencies of the batch
    fn term_weights(freq: &TermFrequency, corpus: &Corpus) -> TermWeights;
}

/// Default engine.
/// idf = ln((1 + N) / (1 + df)) + 1  (smoothed)
/// weight = (1 + ln(count)) * idf
#[derive(Debug, Default)]
pub struct DefaultTermWeightEngine;

impl TermWeightEngine for DefaultTermWeightEngine {
    fn idf_map(corpus: &Corpus) -> TermWeights {
        let doc_num = corpus.get_doc_num() as f64;
        corpus
            .term_counts
            .iter()
            .map(|(term, &df)| {
                let idf = ((1.0 + doc_num) / (1.0 + df as f64)).ln() + 1.0;
                (term.to_string(), idf)
            })
            .collect()
    }

    fn term_weights(freq: &TermFrequency, corpus: &Corpus) -> TermWeights {
        let idf = Self::idf_map(corpus);
        idf.into_iter()
            .map(|(term, idf)| {
                let count = freq.term_count(&term);
                let tf = if count == 0 { 0.0 } else { 1.0 + (count as f64).ln() };
                (term, tf * idf)
            })
            .collect()
    }
}
