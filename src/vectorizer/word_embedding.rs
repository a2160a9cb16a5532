use indexmap::IndexMap;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::VectorizerConfig;
use crate::utils::math::{dot, l2_normalize, norm};

/// Residual norm under which Gram-Schmidt gives up on a candidate
const ORTHO_EPS: f64 = 1e-6;

/// Request-scoped word embedding (random indexing).
///
/// Every vocabulary word, in first-occurrence order, gets a seeded random
/// index vector. While the vocabulary is smaller than the dimension the
/// index vectors are orthonormalized, so unrelated words are exactly
/// orthogonal. A word vector is its index vector plus `context_weight`
/// times the mean index vector of the words seen within `window` positions
/// of it, over all of its occurrences.
///
/// Built fresh for each batch and never shared, so vocabulary cannot leak
/// between unrelated batches.
#[derive(Debug, Clone)]
pub struct WordEmbedding {
    dim: usize,
    vectors: IndexMap<String, Vec<f64>>,
}

impl WordEmbedding {
    /// Train over tokenized phrases
    ///
    /// # Arguments
    /// * `docs` - one token list per phrase
    /// * `config` - dimension / window / context weight / seed
    pub fn train<T: AsRef<str>>(docs: &[Vec<T>], config: &VectorizerConfig) -> Self {
        let dim = config.word_dim.max(1);
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut index: IndexMap<String, Vec<f64>> = IndexMap::new();
        for token in docs.iter().flatten() {
            let token = token.as_ref();
            if index.contains_key(token) {
                continue;
            }
            let candidate: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..=1.0)).collect();
            let basis_len = index.len();
            let vector = if basis_len < dim {
                orthonormalize(candidate, index.values())
            } else {
                unit(candidate)
            };
            index.insert(token.to_string(), vector);
        }

        // context sums
        let mut context: IndexMap<&str, (Vec<f64>, usize)> = IndexMap::with_capacity(index.len());
        for doc in docs {
            for (pos, token) in doc.iter().enumerate() {
                let lo = pos.saturating_sub(config.window);
                let hi = (pos + config.window).min(doc.len().saturating_sub(1));
                let entry = context
                    .entry(token.as_ref())
                    .or_insert_with(|| (vec![0.0; dim], 0));
                for (other_pos, other) in doc.iter().enumerate().take(hi + 1).skip(lo) {
                    if other_pos == pos {
                        continue;
                    }
                    if let Some(other_vec) = index.get(other.as_ref()) {
                        for (acc, v) in entry.0.iter_mut().zip(other_vec) {
                            *acc += v;
                        }
                        entry.1 += 1;
                    }
                }
            }
        }

        let vectors = index
            .iter()
            .map(|(word, base)| {
                let mut v = base.clone();
                if let Some((sum, count)) = context.get(word.as_str()) {
                    if *count > 0 {
                        let scale = config.context_weight / *count as f64;
                        for (x, s) in v.iter_mut().zip(sum) {
                            *x += scale * s;
                        }
                    }
                }
                (word.clone(), v)
            })
            .collect();

        Self { dim, vectors }
    }

    #[inline]
    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.vectors.get(word).map(|v| v.as_slice())
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// vocabulary size
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocab(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(|k| k.as_str())
    }
}

fn unit(mut v: Vec<f64>) -> Vec<f64> {
    l2_normalize(&mut v);
    v
}

/// Gram-Schmidt against an orthonormal basis
fn orthonormalize<'a, I>(candidate: Vec<f64>, basis: I) -> Vec<f64>
where
    I: Iterator<Item = &'a Vec<f64>>,
{
    let mut residual = candidate.clone();
    for b in basis {
        let proj = dot(&residual, b);
        for (r, x) in residual.iter_mut().zip(b) {
            *r -= proj * x;
        }
    }
    if norm(&residual) < ORTHO_EPS {
        return unit(candidate);
    }
    unit(residual)
}
