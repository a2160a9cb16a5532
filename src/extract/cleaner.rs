use regex::Regex;

use crate::error::Error;

/// Characters kept by the cleaner: CJK ideographs, ASCII alphanumerics,
/// common Chinese/ASCII punctuation and whitespace.
const DISALLOWED: &str = r#"[^\x{4e00}-\x{9fa5}a-zA-Z0-9，。！？,.!?;；:：“”‘’"'（）()\s]"#;

/// Review text normalizer applied before phrase extraction
#[derive(Debug, Clone)]
pub struct TextCleaner {
    disallowed: Regex,
    spaces: Regex,
    lowercase: bool,
}

impl TextCleaner {
    pub fn new(lowercase: bool) -> Result<Self, Error> {
        Ok(Self {
            disallowed: Regex::new(DISALLOWED)?,
            spaces: Regex::new(r"\s+")?,
            lowercase,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let kept = self.disallowed.replace_all(text, "");
        let collapsed = self.spaces.replace_all(&kept, " ");
        let trimmed = collapsed.trim();
        if self.lowercase {
            trimmed.to_ascii_lowercase()
        } else {
            trimmed.to_string()
        }
    }
}
