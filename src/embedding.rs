use thiserror::Error;

use crate::analyzer::TextAnalyzer;

pub const DEFAULT_DIMENSION: usize = 384;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("embedding dimension must be non-zero")]
    ZeroDimension,
    #[error("text analysis failed: {0}")]
    Analysis(String),
}

/// Maps text to fixed-width vectors. Chunks and queries must go through the
/// same embedder for their distances to be meaningful.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Feature-hashing embedder: each analyzed term is hashed into one of
/// `dimension` buckets with a hash-derived sign, and the result is
/// L2-normalised. Text with no surviving terms embeds to the zero vector.
pub struct HashingEmbedder {
    analyzer: TextAnalyzer,
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<HashingEmbedder, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::ZeroDimension);
        }
        Ok(HashingEmbedder {
            analyzer: TextAnalyzer::for_plain_text(),
            dimension,
        })
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(PRIME))
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let tokens = self
            .analyzer
            .analyze(text.to_string())
            .map_err(|e| EmbeddingError::Analysis(format!("{e:#}")))?;

        let mut v = vec![0.0f32; self.dimension];
        for token in tokens {
            let h = fnv1a(token.term.as_bytes());
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        l2_normalize(&mut v);
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hashing-tf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            HashingEmbedder::new(0),
            Err(EmbeddingError::ZeroDimension)
        ));
    }

    #[test]
    fn test_embedding_is_normalized() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let v = embedder.embed("rust ownership borrowing lifetimes").unwrap();
        assert_eq!(v.len(), 64);
        assert!((norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stop_words_only_embed_to_zero() {
        let embedder = HashingEmbedder::new(32).unwrap();
        let v = embedder.embed("the and of").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_inflections_share_embedding() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let a = embedder.embed("Crawling pages").unwrap();
        let b = embedder.embed("crawled page").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashingEmbedder::new(16).unwrap();
        let texts = vec!["alpha beta".to_string(), "gamma".to_string()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], embedder.embed("gamma").unwrap());
    }
}
