use serde::{Deserialize, Serialize};

use crate::error::{Result, SlidecraftError};

/// Weights of the lexical fallback score. They sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LexicalWeights {
    /// Jaccard similarity between slide description and semantic description.
    pub description: f32,
    /// Coverage of the template's function text.
    pub function: f32,
    pub tone: f32,
    pub keywords: f32,
}

impl Default for LexicalWeights {
    fn default() -> Self {
        Self {
            description: 0.5,
            function: 0.25,
            tone: 0.15,
            keywords: 0.10,
        }
    }
}

impl LexicalWeights {
    fn sum(&self) -> f32 {
        self.description + self.function + self.tone + self.keywords
    }
}

/// Configuration for template selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// Weight of cosine similarity on the semantic path.
    /// Default: 0.9
    pub semantic_weight: f32,

    /// Weight of the tone-match indicator on the semantic path.
    /// Default: 0.1
    pub tone_weight: f32,

    pub lexical: LexicalWeights,

    /// Selections at or below this confidence are flagged for retry.
    /// Default: 0.5
    pub min_confidence: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.9,
            tone_weight: 0.1,
            lexical: LexicalWeights::default(),
            min_confidence: 0.5,
        }
    }
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the semantic/tone split; the tone weight becomes `1 - semantic`.
    pub fn with_semantic_weight(mut self, weight: f32) -> Self {
        self.semantic_weight = weight.clamp(0.0, 1.0);
        self.tone_weight = 1.0 - self.semantic_weight;
        self
    }

    pub fn with_lexical_weights(mut self, weights: LexicalWeights) -> Self {
        self.lexical = weights;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if (self.semantic_weight + self.tone_weight - 1.0).abs() > 1e-3 {
            return Err(SlidecraftError::Validation(
                "semantic_weight + tone_weight must equal 1.0".to_string(),
            ));
        }
        if (self.lexical.sum() - 1.0).abs() > 1e-3 {
            return Err(SlidecraftError::Validation(
                "lexical weights must sum to 1.0".to_string(),
            ));
        }
        let weights = [
            self.lexical.description,
            self.lexical.function,
            self.lexical.tone,
            self.lexical.keywords,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(SlidecraftError::Validation(
                "lexical weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SelectorConfig::default();
        assert_eq!(config.semantic_weight, 0.9);
        assert_eq!(config.tone_weight, 0.1);
        assert_eq!(config.min_confidence, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_weights_summing_to_one() {
        let config = SelectorConfig::new().with_semantic_weight(0.8).with_min_confidence(1.7);
        assert!((config.tone_weight - 0.2).abs() < 1e-6);
        assert_eq!(config.min_confidence, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_lexical_weights() {
        let config = SelectorConfig::new().with_lexical_weights(LexicalWeights {
            description: 0.9,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }
}
