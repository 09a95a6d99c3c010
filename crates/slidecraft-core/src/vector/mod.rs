mod embedding;

pub use embedding::{cosine_similarity, EmbeddingService, FastEmbedService, HashingEmbedder};
