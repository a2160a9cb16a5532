use regex::Regex;

use crate::error::Error;
use crate::extract::join_pieces;

/// aspect + optional intensity + polarity
const ASPECT_ZH: &str = r"(环境|服务|味道|价格|位置|速度|分量|新鲜度)(很|非常|特别|极其|太)?(好|差|棒|糟|赞|烂|香)(了)?";
/// waiting / serving speed, up to five filler chars between
const SPEED_ZH: &str = r#"(等|上菜)[^，。！？,.!?;；:：“”‘’"'（）()]{0,5}(很|非常|特别)?(快|慢|久)(了)?"#;
const NEGATION_ZH: &str = r"(不)(太|很|是很|怎么)?(满意|好吃|好|新鲜|干净|热情|值)";
const ASPECT_EN: &str = r"(?i)\b(environment|service|taste|price|location|speed|portion|freshness|food)\s+(?:(?:is|was|are|were)\s+)?(?:(very|quite|really|extremely|so|too|pretty)\s+)?(good|bad|great|terrible|excellent|awful|nice|poor|slow|fast|fresh|delicious|attentive|friendly|rude|clean|dirty|cheap|expensive)\b";
const NEGATION_EN: &str = r"(?i)\b(not)\s+(?:(very|quite|really|too|that)\s+)?(satisfied|good|happy|fresh|clean|friendly|worth|tasty|great)\b";

pub const DEFAULT_PATTERNS: &[&str] = &[ASPECT_ZH, SPEED_ZH, ASPECT_EN, NEGATION_ZH, NEGATION_EN];

/// Regular-expression pass over the review text.
/// Every match yields its non-empty capture groups joined into one phrase.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn builtin() -> Result<Self, Error> {
        Self::from_sources(DEFAULT_PATTERNS.iter().copied())
    }

    pub fn from_sources<'a, I>(sources: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let patterns = sources
            .into_iter()
            .map(Regex::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Append extra patterns after the existing ones
    pub fn extend<'a, I>(&mut self, sources: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for source in sources {
            self.patterns.push(Regex::new(source)?);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn find_phrases(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let pieces: Vec<&str> = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str())
                    .filter(|s| !s.is_empty())
                    .collect();
                let phrase = join_pieces(&pieces);
                if !phrase.is_empty() {
                    out.push(phrase);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_aspect_and_speed_patterns() {
        let set = PatternSet::builtin().unwrap();
        let found = set.find_phrases("环境非常好，上菜有点慢了，价格太贵");
        assert!(found.contains(&"环境非常好".to_string()));
        assert!(found.contains(&"上菜慢了".to_string()));
        assert!(!found.iter().any(|p| p.starts_with("价格")));
    }

    #[test]
    fn english_patterns_keep_word_spacing() {
        let set = PatternSet::builtin().unwrap();
        let found = set.find_phrases("the environment quite good but we were not very satisfied");
        assert_eq!(found, vec!["environment quite good".to_string(), "not very satisfied".to_string()]);
    }

    #[test]
    fn copula_is_dropped_from_phrase() {
        let set = PatternSet::builtin().unwrap();
        assert_eq!(set.find_phrases("service was slow"), vec!["service slow".to_string()]);
    }

    #[test]
    fn bad_custom_pattern_is_an_error() {
        let mut set = PatternSet::builtin().unwrap();
        assert!(set.extend(["(unclosed"]).is_err());
        assert_eq!(set.len(), DEFAULT_PATTERNS.len());
    }
}
