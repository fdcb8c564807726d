// src/embedder.rs
// External embedding capability consumed by the pipeline: text in, fixed-length
// vector out, plus a token count. Implementations must be deterministic for
// identical input and safe to call concurrently.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};

use anyhow::Result;

pub trait Embedder: Send + Sync {
    /// Encode text into a fixed-length vector. The only operation in the
    /// pipeline that may suspend; callers impose their own timeout.
    fn encode(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;

    /// Tokenizer-accurate token count for the given text.
    fn token_count(&self, text: &str) -> usize;
}

/// Deterministic character-trigram hashing embedder. Stands in for the real
/// multilingual sentence model in the demo binary and in tests: identical
/// texts map to identical unit vectors, similar spellings land close.
#[derive(Debug, Clone)]
pub struct HashedNgramEmbedder {
    dim: usize,
}

impl HashedNgramEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();
        let chars: Vec<char> = normalized.chars().collect();
        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3.min(chars.len())) {
            let mut hasher = DefaultHasher::new();
            window.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dim;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashedNgramEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn token_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
