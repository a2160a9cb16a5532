//! Candidate aspect-phrase extraction.
//!
//! A review is tagged by the injected `PosTagger`, scanned left to right by a
//! greedy non-overlapping rule set, then searched by the regular-expression
//! `PatternSet`. The result is an insertion-ordered set of phrases.

pub mod cleaner;
pub mod patterns;
pub mod tagger;

use std::sync::Arc;

use indexmap::IndexSet;

use crate::config::ExtractorConfig;
use crate::error::{Error, TaggerError};
use crate::extract::patterns::PatternSet;
use crate::extract::tagger::{is_cjk, PosTagger, TaggedToken};

/// Aspect nouns that always form a phrase on their own
pub const ASPECT_SEEDS: &[&str] = &[
    "environment", "service", "taste", "price", "location", "speed", "portion", "freshness",
    "环境", "服务", "味道", "价格", "位置", "速度", "分量", "新鲜度",
];

pub struct PhraseExtractor {
    tagger: Arc<dyn PosTagger>,
    patterns: PatternSet,
    config: ExtractorConfig,
}

impl PhraseExtractor {
    pub fn new(tagger: Arc<dyn PosTagger>, config: ExtractorConfig) -> Result<Self, Error> {
        Ok(Self::with_patterns(tagger, PatternSet::builtin()?, config))
    }

    pub fn with_patterns(tagger: Arc<dyn PosTagger>, patterns: PatternSet, config: ExtractorConfig) -> Self {
        Self { tagger, patterns, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the candidate phrases of one cleaned review.
    ///
    /// Blank input yields an empty set. Any other input yields at least one
    /// phrase: when neither pass matches, the first `fallback_chars`
    /// characters of the review are returned.
    pub fn extract_key_phrases(&self, review: &str) -> Result<IndexSet<String>, TaggerError> {
        let review = review.trim();
        if review.is_empty() {
            return Ok(IndexSet::new());
        }
        let tokens = self.tagger.tag(review)?;

        let mut candidates = scan_tokens(&tokens);
        candidates.extend(self.patterns.find_phrases(review));

        let mut phrases: IndexSet<String> = candidates
            .into_iter()
            .filter(|p| p.chars().count() >= self.config.min_phrase_chars)
            .collect();

        if phrases.is_empty() {
            phrases.insert(truncate_chars(review, self.config.fallback_chars));
        }
        Ok(phrases)
    }

    /// Phrase used for a review when a whole batch produced nothing
    pub fn emergency_phrase(&self, review: &str) -> String {
        let review = review.trim();
        if review.is_empty() {
            self.config.empty_placeholder.clone()
        } else {
            truncate_chars(review, self.config.fallback_chars)
        }
    }
}

/// Greedy POS rule scan.
/// At each position, in priority order:
/// noun+adj, noun+adv+adj, adv+adj, standalone noun (>= 2 chars) or seed.
fn scan_tokens(tokens: &[TaggedToken]) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        let next = tokens.get(i + 1);
        let after = tokens.get(i + 2);

        if tok.is_noun() && next.is_some_and(|t| t.is_adjective()) {
            phrases.push(join_tokens(&tokens[i..i + 2]));
            i += 2;
            continue;
        }
        if tok.is_noun()
            && next.is_some_and(|t| t.is_adverb())
            && after.is_some_and(|t| t.is_adjective())
        {
            phrases.push(join_tokens(&tokens[i..i + 3]));
            i += 3;
            continue;
        }
        if tok.is_adverb() && next.is_some_and(|t| t.is_adjective()) {
            phrases.push(join_tokens(&tokens[i..i + 2]));
            i += 2;
            continue;
        }
        if (tok.is_noun() && tok.char_len() >= 2) || is_seed(&tok.text) {
            phrases.push(tok.text.clone());
        }
        i += 1;
    }
    phrases
}

#[inline]
fn is_seed(text: &str) -> bool {
    let lower = text.to_lowercase();
    ASPECT_SEEDS.contains(&lower.as_str())
}

fn join_tokens(tokens: &[TaggedToken]) -> String {
    let pieces: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    join_pieces(&pieces)
}

/// Concatenate phrase pieces.
/// A space goes between two pieces only when both touching chars are
/// non-CJK alphanumerics.
pub fn join_pieces(pieces: &[&str]) -> String {
    let mut out = String::new();
    for piece in pieces.iter().filter(|p| !p.is_empty()) {
        let needs_space = match (out.chars().last(), piece.chars().next()) {
            (Some(l), Some(r)) => is_spaced(l) && is_spaced(r),
            _ => false,
        };
        if needs_space {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

#[inline]
fn is_spaced(c: char) -> bool {
    c.is_alphanumeric() && !is_cjk(c)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tagger::LexiconTagger;
    use proptest::prelude::*;

    struct FailingTagger;
    impl PosTagger for FailingTagger {
        fn tag(&self, _text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
            Err(TaggerError::Failed { reason: "dictionary not loaded".into() })
        }
    }

    fn extractor() -> PhraseExtractor {
        PhraseExtractor::new(Arc::new(LexiconTagger::default()), ExtractorConfig::default()).unwrap()
    }

    fn list(set: IndexSet<String>) -> Vec<String> {
        set.into_iter().collect()
    }

    #[test]
    fn noun_adverb_adjective_and_noun_adjective() {
        let phrases = extractor().extract_key_phrases("environment very good, service attentive").unwrap();
        assert_eq!(list(phrases), vec!["environment very good", "service attentive"]);
    }

    #[test]
    fn adverb_adjective_and_standalone_nouns() {
        let phrases = extractor().extract_key_phrases("the seafood was really fresh").unwrap();
        assert_eq!(list(phrases), vec!["seafood", "really fresh"]);
    }

    #[test]
    fn seed_noun_after_adjective_stands_alone() {
        let phrases = extractor().extract_key_phrases("good service").unwrap();
        assert_eq!(list(phrases), vec!["service"]);
    }

    #[test]
    fn chinese_review_mixes_rules_and_patterns() {
        let phrases = extractor().extract_key_phrases("这家餐厅环境很好，服务态度特别棒").unwrap();
        assert_eq!(list(phrases), vec!["餐厅", "环境很好", "服务", "态度特别棒"]);
    }

    #[test]
    fn negation_pattern_adds_phrase() {
        let phrases = extractor().extract_key_phrases("we were not very satisfied").unwrap();
        assert!(phrases.contains("very satisfied"));
        assert!(phrases.contains("not very satisfied"));
    }

    #[test]
    fn unmatched_review_falls_back_to_prefix() {
        let phrases = extractor()
            .extract_key_phrases("it was so so and we were too")
            .unwrap();
        assert_eq!(list(phrases), vec!["it was so so and we"]);
    }

    #[test]
    fn blank_review_yields_nothing() {
        assert!(extractor().extract_key_phrases("").unwrap().is_empty());
        assert!(extractor().extract_key_phrases("  ").unwrap().is_empty());
    }

    #[test]
    fn tagger_failure_is_reported() {
        let ex = PhraseExtractor::new(Arc::new(FailingTagger), ExtractorConfig::default()).unwrap();
        assert!(ex.extract_key_phrases("service slow").is_err());
    }

    #[test]
    fn emergency_phrase_uses_placeholder_for_blank() {
        let ex = extractor();
        assert_eq!(ex.emergency_phrase(""), "(empty review)");
        assert_eq!(ex.emergency_phrase("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst");
    }

    fn arb_review() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]",
            "[\u{4e00}-\u{9fa5}]",
            "[\u{4e00}-\u{9fa5}]{2,12}",
            "[，。！？,.!?;：()]{1,6}",
            "[a-z ]{1,40}",
            "\\PC{1,30}",
        ]
        .prop_filter("blank reviews yield nothing", |s| !s.trim().is_empty())
    }

    proptest! {
        #[test]
        fn non_blank_review_always_yields_a_phrase(review in arb_review()) {
            let phrases = extractor().extract_key_phrases(&review).unwrap();
            prop_assert!(!phrases.is_empty());
            prop_assert!(phrases.iter().all(|p| !p.is_empty()));
        }
    }

    #[test]
    fn join_spacing_depends_on_script() {
        assert_eq!(join_pieces(&["环境", "很", "好"]), "环境很好");
        assert_eq!(join_pieces(&["dish", "delicious"]), "dish delicious");
        assert_eq!(join_pieces(&["", "fresh"]), "fresh");
    }
}
