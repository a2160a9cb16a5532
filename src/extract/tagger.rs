use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TaggerError;

/// One token with its part-of-speech tag.
/// Tags are categorical strings whose first character is the category
/// (`n` noun, `a` adjective, `d` adverb, `v` verb, `x` punctuation/unknown ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { text: text.into(), tag: tag.into() }
    }

    #[inline]
    fn category(&self) -> Option<char> {
        self.tag.chars().next()
    }

    #[inline]
    pub fn is_noun(&self) -> bool {
        self.category() == Some('n')
    }

    #[inline]
    pub fn is_adjective(&self) -> bool {
        self.category() == Some('a')
    }

    #[inline]
    pub fn is_adverb(&self) -> bool {
        self.category() == Some('d')
    }

    #[inline]
    pub fn is_punctuation(&self) -> bool {
        self.category() == Some('x')
    }

    /// Char count, not byte count
    #[inline]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Word segmentation + part-of-speech tagging collaborator.
///
/// Implementations are built once and shared read-only between batches.
pub trait PosTagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError>;
}

/// word -> tag dictionary used by `LexiconTagger`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    entries: IndexMap<String, String>,
    /// longest CJK entry in chars, bounds the forward maximum match
    max_cjk_len: usize,
}

const NOUNS_EN: &[&str] = &[
    "environment", "service", "taste", "price", "location", "speed", "portion", "freshness",
    "food", "dish", "dishes", "staff", "waiter", "waitress", "restaurant", "place",
    "atmosphere", "decor", "ambience", "seafood", "menu", "meal", "dessert", "drinks",
    "coffee", "noodles", "rice", "soup", "wait", "value", "quality", "flavor", "flavour",
    "parking", "table", "music", "owner", "chef", "beef", "chicken", "fish",
];
const ADJECTIVES_EN: &[&str] = &[
    "good", "bad", "great", "excellent", "terrible", "awful", "nice", "poor", "slow", "fast",
    "fresh", "delicious", "tasty", "bland", "attentive", "friendly", "rude", "clean", "dirty",
    "cheap", "expensive", "noisy", "quiet", "cozy", "okay", "ok", "satisfied", "happy",
    "disappointing", "amazing", "average", "reasonable", "cold", "hot", "warm", "spicy",
    "salty", "sweet", "crowded", "comfortable", "worth", "horrible", "wonderful", "best",
    "worst", "lovely", "perfect",
];
const ADVERBS_EN: &[&str] = &[
    "very", "quite", "really", "extremely", "so", "too", "rather", "pretty", "fairly",
    "super", "not", "never", "always", "also", "still", "just",
];
const FUNCTION_WORDS_EN: &[(&str, &str)] = &[
    ("the", "r"), ("a", "r"), ("an", "r"), ("this", "r"), ("that", "r"), ("these", "r"),
    ("those", "r"), ("it", "r"), ("we", "r"), ("i", "r"), ("they", "r"), ("our", "r"),
    ("my", "r"), ("is", "v"), ("was", "v"), ("were", "v"), ("are", "v"), ("be", "v"),
    ("had", "v"), ("have", "v"), ("has", "v"), ("recommend", "v"), ("came", "v"),
    ("and", "c"), ("but", "c"), ("or", "c"), ("with", "p"), ("of", "p"), ("in", "p"),
    ("at", "p"), ("for", "p"), ("to", "p"), ("on", "p"),
];

const NOUNS_ZH: &[&str] = &[
    "环境", "服务", "味道", "价格", "位置", "速度", "分量", "新鲜度", "菜品", "餐厅",
    "服务员", "态度", "装修", "口味", "菜", "海鲜", "性价比", "交通", "招牌菜", "格调",
    "种类", "时间",
];
const ADJECTIVES_ZH: &[&str] = &[
    "好", "差", "棒", "糟", "赞", "烂", "香", "美味", "新鲜", "贵", "便宜", "实惠", "热情",
    "一般", "满意", "好吃", "难吃", "干净", "舒适", "嘈杂", "安静", "快", "慢", "久", "不错",
    "多", "少", "便利", "好找",
];
const ADVERBS_ZH: &[&str] = &[
    "很", "非常", "特别", "极其", "太", "比较", "挺", "有点", "也", "还", "不", "真", "超级",
    "尤其", "就是",
];
const FUNCTION_WORDS_ZH: &[(&str, &str)] = &[
    ("这", "r"), ("这家", "r"), ("家", "q"), ("的", "uj"), ("了", "ul"), ("但是", "c"),
    ("是", "v"), ("等", "v"), ("推荐", "v"), ("上菜", "v"), ("有", "v"),
];

impl Lexicon {
    /// Empty dictionary
    pub fn new() -> Self {
        Self { entries: IndexMap::new(), max_cjk_len: 0 }
    }

    /// Bilingual restaurant-domain dictionary
    pub fn builtin() -> Self {
        let mut lex = Self::new();
        for word in NOUNS_EN.iter().chain(NOUNS_ZH) {
            lex.insert(word, "n");
        }
        for word in ADJECTIVES_EN.iter().chain(ADJECTIVES_ZH) {
            lex.insert(word, "a");
        }
        for word in ADVERBS_EN.iter().chain(ADVERBS_ZH) {
            lex.insert(word, "d");
        }
        for (word, tag) in FUNCTION_WORDS_EN.iter().chain(FUNCTION_WORDS_ZH) {
            lex.insert(word, tag);
        }
        lex
    }

    /// Add or overwrite an entry.
    /// ASCII words are stored lowercased.
    pub fn insert(&mut self, word: &str, tag: &str) -> &mut Self {
        let key = word.to_ascii_lowercase();
        if key.chars().any(is_cjk) {
            self.max_cjk_len = self.max_cjk_len.max(key.chars().count());
        }
        self.entries.insert(key, tag.to_string());
        self
    }

    /// Merge a user dictionary in `word [tag]` per line format.
    /// Blank lines and `#` comments are skipped, a missing tag means noun.
    pub fn merge_user_dict(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            if let Some(word) = fields.next() {
                // jieba format allows "word freq tag", take the last non-numeric field
                let tag = fields
                    .filter(|f| !f.chars().all(|c| c.is_ascii_digit()))
                    .last()
                    .unwrap_or("n");
                self.insert(word, tag);
            }
        }
        self
    }

    pub fn load_user_dict<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self, TaggerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TaggerError::UserDict {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.merge_user_dict(&text))
    }

    #[inline]
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(|s| s.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dictionary-driven tagger.
/// ASCII words are looked up case-insensitively, CJK runs are segmented by
/// forward maximum matching, every other symbol becomes an `x` token.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    lexicon: Lexicon,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

impl LexiconTagger {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn tag_word(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some(tag) = self.lexicon.get(&lower) {
            return tag.to_string();
        }
        if lower.chars().all(|c| c.is_ascii_digit()) {
            "m".to_string()
        } else if lower.len() > 3 && lower.ends_with("ly") {
            "d".to_string()
        } else {
            "n".to_string()
        }
    }

    /// forward maximum matching over one CJK run
    fn segment_cjk(&self, run: &[char], out: &mut Vec<TaggedToken>) {
        let mut start = 0;
        while start < run.len() {
            let longest = self.lexicon.max_cjk_len.min(run.len() - start);
            let mut matched = None;
            for len in (1..=longest).rev() {
                let candidate: String = run[start..start + len].iter().collect();
                if let Some(tag) = self.lexicon.get(&candidate) {
                    matched = Some((candidate, tag.to_string(), len));
                    break;
                }
            }
            match matched {
                Some((text, tag, len)) => {
                    out.push(TaggedToken::new(text, tag));
                    start += len;
                }
                None => {
                    out.push(TaggedToken::new(run[start].to_string(), "x"));
                    start += 1;
                }
            }
        }
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if is_cjk(c) {
                let start = i;
                while i < chars.len() && is_cjk(chars[i]) {
                    i += 1;
                }
                self.segment_cjk(&chars[start..i], &mut tokens);
            } else if is_word_char(c) {
                let start = i;
                while i < chars.len() && (is_word_char(chars[i]) || chars[i] == '\'') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let tag = self.tag_word(&word);
                tokens.push(TaggedToken::new(word, tag));
            } else {
                tokens.push(TaggedToken::new(c.to_string(), "x"));
                i += 1;
            }
        }
        Ok(tokens)
    }
}

/// CJK unified ideographs (+ extension A)
#[inline]
pub fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() && !is_cjk(c)
}
