use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TermFrequency struct
/// Manages the frequency of term occurrences over the tokenized phrases of
/// one batch. Terms keep their first-occurrence order.
///
/// # Examples
/// ```
/// use aspect_cluster::vectorizer::term::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_terms(&["service", "slow", "service"]);
///
/// assert_eq!(term_freq.term_count("service"), 2);
/// assert_eq!(term_freq.term_count("fast"), 0);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u64>,
}

impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency { term_count: IndexMap::new() }
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        *self.term_count.entry(term.to_string()).or_insert(0) += 1;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Occurrence count of a term, 0 when unseen
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_across_phrases() {
        let mut tf = TermFrequency::new();
        tf.add_terms(&["good", "service"]).add_terms(&["good", "food"]);
        tf.add_term("good");
        assert_eq!(tf.term_count("good"), 3);
        assert_eq!(tf.term_count("food"), 1);
        assert_eq!(tf.term_count("missing"), 0);
    }
}
