//! Offline feature-hashing embedder
//!
//! Each lowercase alphanumeric token is hashed into one of `dimensions` buckets
//! with a hash-derived sign, and the result is L2-normalised. No model, no network:
//! texts sharing vocabulary land close together, which is all the tests and an
//! air-gapped deployment need.

use async_trait::async_trait;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::error::Result;

use super::embedding::EmbeddingProvider;

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create a new hashing embedder
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed synchronously
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();

            let idx = (h % self.dimensions as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn test_deterministic_and_sized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_sync("Machine learning is fun.");
        let b = embedder.embed_sync("Machine learning is fun.");
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::new(64);
        assert_eq!(
            embedder.embed_sync("Machine Learning!"),
            embedder.embed_sync("machine, learning")
        );
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed_sync("what is machine learning");
        let related = embedder.embed_sync("It discusses machine learning.");
        let unrelated = embedder.embed_sync("The harbour froze over in January.");
        assert!(l2(&query, &related) < l2(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_sync("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_trait_embed_matches_sync() {
        let embedder = HashingEmbedder::new(32);
        let via_trait = embedder.embed("hello world").await.unwrap();
        assert_eq!(via_trait, embedder.embed_sync("hello world"));
        assert_eq!(embedder.dimensions(), 32);
    }
}
