use crate::error::EmbeddingError;
use crate::utils::math::l2_normalize;

/// Pretrained sentence-embedding collaborator.
/// Used as a black box for small phrase lists.
pub trait SentenceEmbedder: Send + Sync {
    /// One vector per input text, same order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimension
    fn dimensions(&self) -> usize;
}

/// Character n-gram feature hashing embedder.
///
/// Every 1-3 char gram of every whitespace token is hashed with FNV-1a
/// into a fixed number of buckets, and the count vector is L2 normalized.
/// Deterministic and model free, so it is always available.
#[derive(Debug, Clone)]
pub struct HashingSentenceEmbedder {
    dimensions: usize,
    max_gram: usize,
}

impl Default for HashingSentenceEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl HashingSentenceEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1), max_gram: 3 }
    }

    #[inline]
    fn bucket(gram: &[char], dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        let mut buf = [0u8; 4];
        for c in gram {
            for b in c.encode_utf8(&mut buf).as_bytes() {
                h ^= *b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
        }
        (h % dims as u64) as usize
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            let chars: Vec<char> = token.to_lowercase().chars().collect();
            for n in 1..=self.max_gram.min(chars.len()) {
                for gram in chars.windows(n) {
                    vec[Self::bucket(gram, self.dimensions)] += 1.0;
                }
            }
        }
        l2_normalize(&mut vec);
        vec
    }
}

impl SentenceEmbedder for HashingSentenceEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
