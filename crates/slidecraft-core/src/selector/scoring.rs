use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::{LexicalWeights, SelectorConfig};
use crate::error::{Result, SlidecraftError};
use crate::templates::{TemplateLibrary, TextualTemplate};
use crate::text::{coverage, jaccard, token_set};
use crate::types::Embedding;
use crate::vector::{cosine_similarity, EmbeddingService};

/// Which scoring path produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    Semantic,
    Fallback,
}

impl std::fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMethod::Semantic => write!(f, "semantic"),
            ScoringMethod::Fallback => write!(f, "fallback"),
        }
    }
}

/// What a slide asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideQuery {
    pub description: String,
    pub tone: String,
}

/// A query with its per-request derived data computed once.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub description: String,
    pub description_tokens: HashSet<String>,
    pub tone_tokens: HashSet<String>,
    pub embedding: Option<Embedding>,
}

impl PreparedQuery {
    fn lexical(query: &SlideQuery) -> Self {
        Self {
            description: query.description.clone(),
            description_tokens: token_set(&query.description),
            tone_tokens: token_set(&query.tone),
            embedding: None,
        }
    }
}

/// Scores one template against one prepared query. Scores are in [0, 1].
pub trait TemplateScorer: Send + Sync {
    fn method(&self) -> ScoringMethod;

    fn prepare(&self, query: &SlideQuery) -> Result<PreparedQuery>;

    fn score(&self, template: &TextualTemplate, query: &PreparedQuery) -> f32;
}

fn tone_match(template: &TextualTemplate, query: &PreparedQuery) -> f32 {
    let template_tone = token_set(&template.tone);
    if template_tone.intersection(&query.tone_tokens).next().is_some() {
        1.0
    } else {
        0.0
    }
}

fn unit(score: f32) -> f32 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Cosine similarity against precomputed template anchors, blended with tone.
pub struct SemanticScorer {
    embedder: Arc<dyn EmbeddingService>,
    anchors: HashMap<String, Embedding>,
    semantic_weight: f32,
    tone_weight: f32,
}

impl SemanticScorer {
    /// Embed every template's semantic description once.
    ///
    /// Fails when the embedder errors or returns vectors of the wrong shape,
    /// which is what the capability probe keys on.
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        library: &TemplateLibrary,
        config: &SelectorConfig,
    ) -> Result<Self> {
        let texts: Vec<String> = library.iter().map(|t| t.semantic_description.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(SlidecraftError::Embedding(format!(
                "Expected {} anchor embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        let dimension = embedder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(SlidecraftError::Embedding(format!(
                "Anchor embedding has dimension {}, expected {}",
                bad.len(),
                dimension
            )));
        }

        let anchors = library
            .iter()
            .map(|t| t.id.clone())
            .zip(vectors)
            .collect();

        Ok(Self {
            embedder,
            anchors,
            semantic_weight: config.semantic_weight,
            tone_weight: config.tone_weight,
        })
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

impl TemplateScorer for SemanticScorer {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Semantic
    }

    fn prepare(&self, query: &SlideQuery) -> Result<PreparedQuery> {
        let mut prepared = PreparedQuery::lexical(query);
        prepared.embedding = Some(self.embedder.embed(&query.description)?);
        Ok(prepared)
    }

    fn score(&self, template: &TextualTemplate, query: &PreparedQuery) -> f32 {
        let cosine = match (self.anchors.get(&template.id), &query.embedding) {
            (Some(anchor), Some(embedding)) => cosine_similarity(anchor, embedding),
            _ => {
                log::warn!("No anchor embedding for template {}", template.id);
                0.0
            }
        };
        unit(self.semantic_weight * cosine + self.tone_weight * tone_match(template, query))
    }
}

/// Token-overlap scorer used when no embedding facility is available.
pub struct LexicalScorer {
    weights: LexicalWeights,
}

impl LexicalScorer {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            weights: config.lexical.clone(),
        }
    }
}

impl TemplateScorer for LexicalScorer {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Fallback
    }

    fn prepare(&self, query: &SlideQuery) -> Result<PreparedQuery> {
        Ok(PreparedQuery::lexical(query))
    }

    fn score(&self, template: &TextualTemplate, query: &PreparedQuery) -> f32 {
        let description = jaccard(
            &query.description_tokens,
            &token_set(&template.semantic_description),
        );
        let function = coverage(&token_set(&template.function), &query.description_tokens);
        let tone = jaccard(&token_set(&template.tone), &query.tone_tokens);

        let keyword_sets: Vec<HashSet<String>> = template
            .keywords
            .iter()
            .map(|k| token_set(k))
            .filter(|k| !k.is_empty())
            .collect();
        let keywords = if keyword_sets.is_empty() {
            0.0
        } else {
            let hits = keyword_sets
                .iter()
                .filter(|k| k.is_subset(&query.description_tokens))
                .count();
            hits as f32 / keyword_sets.len() as f32
        };

        unit(
            self.weights.description * description
                + self.weights.function * function
                + self.weights.tone * tone
                + self.weights.keywords * keywords,
        )
    }
}

/// Bind a scorer once at startup.
///
/// With a working embedder every template anchor is embedded up front and the
/// semantic scorer is returned. Without one, or if precomputation fails, the
/// lexical scorer is bound instead.
pub fn probe_scorer(
    embedder: Option<Arc<dyn EmbeddingService>>,
    library: &TemplateLibrary,
    config: &SelectorConfig,
) -> Arc<dyn TemplateScorer> {
    let Some(embedder) = embedder else {
        log::info!("No embedding service configured; using fallback template scoring");
        return Arc::new(LexicalScorer::new(config));
    };

    let model = embedder.model_name().to_string();
    match SemanticScorer::new(embedder, library, config) {
        Ok(scorer) => {
            log::info!(
                "Semantic template scoring enabled ({}, {} anchors)",
                model,
                scorer.anchor_count()
            );
            Arc::new(scorer)
        }
        Err(e) => {
            log::warn!("Embedding service {} unavailable ({}); using fallback scoring", model, e);
            Arc::new(LexicalScorer::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::HashingEmbedder;

    struct BrokenEmbedder;

    impl EmbeddingService for BrokenEmbedder {
        fn embed(&self, _text: &str) -> Result<Embedding> {
            Err(SlidecraftError::Embedding("offline".into()))
        }
        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>> {
            Err(SlidecraftError::Embedding("offline".into()))
        }
        fn dimension(&self) -> usize {
            384
        }
        fn model_name(&self) -> &str {
            "broken"
        }
    }

    struct WrongDimension;

    impl EmbeddingService for WrongDimension {
        fn embed(&self, _text: &str) -> Result<Embedding> {
            Ok(vec![0.5; 8])
        }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts.iter().map(|_| vec![0.5; 8]).collect())
        }
        fn dimension(&self) -> usize {
            16
        }
        fn model_name(&self) -> &str {
            "wrong-dimension"
        }
    }

    fn query(description: &str, tone: &str) -> SlideQuery {
        SlideQuery {
            description: description.into(),
            tone: tone.into(),
        }
    }

    #[test]
    fn probe_binds_semantic_with_working_embedder() {
        let lib = TemplateLibrary::builtin();
        let scorer = probe_scorer(
            Some(Arc::new(HashingEmbedder::default())),
            &lib,
            &SelectorConfig::default(),
        );
        assert_eq!(scorer.method(), ScoringMethod::Semantic);
    }

    #[test]
    fn probe_falls_back_when_embedder_fails_or_is_absent() {
        let lib = TemplateLibrary::builtin();
        let config = SelectorConfig::default();
        assert_eq!(probe_scorer(None, &lib, &config).method(), ScoringMethod::Fallback);
        assert_eq!(
            probe_scorer(Some(Arc::new(BrokenEmbedder)), &lib, &config).method(),
            ScoringMethod::Fallback
        );
        assert_eq!(
            probe_scorer(Some(Arc::new(WrongDimension)), &lib, &config).method(),
            ScoringMethod::Fallback
        );
    }

    #[test]
    fn semantic_tone_bonus_is_additive() {
        let lib = TemplateLibrary::builtin();
        let scorer =
            SemanticScorer::new(Arc::new(HashingEmbedder::default()), &lib, &SelectorConfig::default())
                .unwrap();
        let template = lib.get("VD01").unwrap();
        let with_tone = scorer.prepare(&query("percentage statistic", "authoritative")).unwrap();
        let without = scorer.prepare(&query("percentage statistic", "playful")).unwrap();
        let delta = scorer.score(template, &with_tone) - scorer.score(template, &without);
        assert!((delta - 0.1).abs() < 1e-5, "delta {delta}");
    }

    #[test]
    fn lexical_score_components() {
        let lib = TemplateLibrary::builtin();
        let scorer = LexicalScorer::new(&SelectorConfig::default());
        let template = lib.get("VD01").unwrap();
        let exact = scorer
            .prepare(&query(&template.semantic_description, &template.tone))
            .unwrap();
        let score = scorer.score(template, &exact);
        // Full description and tone overlap; function and keywords partly covered.
        assert!(score >= 0.65, "score {score}");
        assert!(score <= 1.0);

        let unrelated = scorer.prepare(&query("zebra umbrella", "sleepy")).unwrap();
        assert_eq!(scorer.score(template, &unrelated), 0.0);
    }
}
