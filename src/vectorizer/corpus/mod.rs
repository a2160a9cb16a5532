use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// keep document count and per-term document frequency for one batch.
/// A "document" here is one tokenized phrase.
///
/// Built fresh for every vectorization call, never shared between batches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: u64,
    /// documents containing each term, first-occurrence order
    #[serde(with = "indexmap::map::serde_seq")]
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Build from tokenized documents
    pub fn from_documents<T>(docs: &[Vec<T>]) -> Self
    where
        T: AsRef<str>,
    {
        let mut corpus = Self::new();
        for doc in docs {
            corpus.add_set(doc);
        }
        corpus
    }

    /// Add a document's terms to the corpus.
    /// Repeated terms inside one document count once.
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        let mut seen: Vec<&str> = Vec::with_capacity(terms.len());
        for term in terms {
            let term = term.as_ref();
            if seen.contains(&term) {
                continue;
            }
            seen.push(term);
            self.term_counts
                .entry(term.into())
                .and_modify(|count| *count += 1)
                .or_insert(1);
        }
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_frequency_counts_each_doc_once() {
        let docs = vec![
            vec!["service", "very", "slow", "service"],
            vec!["service", "fast"],
            vec!["fresh", "seafood"],
        ];
        let corpus = Corpus::from_documents(&docs);
        assert_eq!(corpus.get_doc_num(), 3);
        assert_eq!(corpus.term_counts["service"], 2);
        assert_eq!(corpus.term_counts["seafood"], 1);
        assert!(!corpus.term_counts.contains_key("missing"));
        assert_eq!(
            corpus.term_counts.keys().map(|t| &**t).collect::<Vec<&str>>(),
            vec!["service", "very", "slow", "fast", "fresh", "seafood"]
        );
    }
}
