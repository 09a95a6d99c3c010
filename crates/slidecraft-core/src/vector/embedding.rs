use crate::error::{Result, SlidecraftError};
use crate::text::tokenize;
use crate::types::Embedding;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding as FastEmbedModel};
use std::collections::BTreeMap;

/// Text-to-vector backend used by the semantic scorer.
pub trait EmbeddingService: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts in one call; the output order matches `texts`.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    fn dimension(&self) -> usize;

    /// Name reported in logs and selection justifications.
    fn model_name(&self) -> &str;
}

/// Local ONNX embeddings through FastEmbed. Downloads the model on first use.
pub struct FastEmbedService {
    model: FastEmbedModel,
    model_name: String,
    dimension: usize,
}

impl FastEmbedService {
    /// BGE small (384 dimensions).
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::BGESmallENV15)
    }

    /// Create a service from a model identifier such as `BAAI/bge-small-en-v1.5`.
    pub fn from_name(name: &str) -> Result<Self> {
        let model = match name {
            "BAAI/bge-small-en-v1.5" | "bge-small" => EmbeddingModel::BGESmallENV15,
            "BAAI/bge-base-en-v1.5" | "bge-base" => EmbeddingModel::BGEBaseENV15,
            "BAAI/bge-large-en-v1.5" | "bge-large" => EmbeddingModel::BGELargeENV15,
            "sentence-transformers/all-MiniLM-L6-v2" | "minilm-l6" => EmbeddingModel::AllMiniLML6V2,
            "sentence-transformers/all-MiniLM-L12-v2" | "minilm-l12" => {
                EmbeddingModel::AllMiniLML12V2
            }
            "intfloat/multilingual-e5-small" | "e5-small" => EmbeddingModel::MultilingualE5Small,
            other => {
                return Err(SlidecraftError::Embedding(format!(
                    "Unknown embedding model: {}",
                    other
                )))
            }
        };
        Self::with_model(model)
    }

    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let init_options = InitOptions::new(model.clone()).with_show_download_progress(false);

        let fastembed_model = FastEmbedModel::try_new(init_options)
            .map_err(|e| SlidecraftError::Embedding(format!("Failed to initialize FastEmbed: {}", e)))?;

        let dimension = match &model {
            EmbeddingModel::BGEBaseENV15 => 768,
            EmbeddingModel::BGELargeENV15 => 1024,
            _ => 384,
        };
        let model_name = format!("{:?}", model);

        Ok(Self {
            model: fastembed_model,
            model_name,
            dimension,
        })
    }
}

impl EmbeddingService for FastEmbedService {
    fn embed(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| SlidecraftError::Embedding(format!("{} returned no vector", self.model_name)))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| SlidecraftError::Embedding(format!("{} failed: {}", self.model_name, e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl<E: EmbeddingService + ?Sized> EmbeddingService for std::sync::Arc<E> {
    fn embed(&self, text: &str) -> Result<Embedding> {
        (**self).embed(text)
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }
    fn dimension(&self) -> usize {
        (**self).dimension()
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Deterministic feature-hashing embedder.
///
/// Terms are hashed into fixed buckets with FNV-1a and weighted by term
/// frequency times a length-based idf proxy, then L2 normalised. Needs no
/// model download, so it works offline and in tests.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingService for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let tokens = tokenize(text);
        let mut vec = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            return Ok(vec);
        }

        // BTreeMap keeps accumulation order stable across runs.
        let mut tf: BTreeMap<&str, f32> = BTreeMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in tf {
            let idf = 1.0 + (term.chars().count() as f32).ln();
            vec[Self::bucket(term, self.dimension)] += (count / total) * idf;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        Ok(vec)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "fnv-hashing"
    }
}

/// Cosine similarity in [-1, 1]; zero when either vector is empty or all-zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_embedder_is_normalised_and_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Show a percentage statistic with a credible source").unwrap();
        let b = embedder.embed("Show a percentage statistic with a credible source").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hashing_embedder_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed("a the of").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn related_texts_score_higher() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("percentage statistic from a credible source").unwrap();
        let close = embedder.embed("a statistic with its source and percentage").unwrap();
        let far = embedder.embed("follow the account for weekly content").unwrap();
        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    #[ignore] // Requires downloading model
    fn test_fastembed_service() {
        let service = FastEmbedService::new().unwrap();
        assert_eq!(service.dimension(), 384);
        let embedding = service.embed("Show a percentage statistic").unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        assert!(matches!(
            FastEmbedService::from_name("no-such-model"),
            Err(SlidecraftError::Embedding(_))
        ));
    }
}
