//! Maps a slide's narrative intent to the best-matching textual template.

mod config;
mod scoring;

pub use config::{LexicalWeights, SelectorConfig};
pub use scoring::{
    probe_scorer, LexicalScorer, PreparedQuery, ScoringMethod, SemanticScorer, SlideQuery,
    TemplateScorer,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::brief::CoherenceBrief;
use crate::error::{Result, SlidecraftError};
use crate::templates::{ModuleType, TemplateLibrary};
use crate::types::{NarrativeStructure, Platform, SlideSpec, TemplateType, ValueSubtype};
use crate::vector::EmbeddingService;

/// Candidate pools for a slide type. `None` means the combination is unmapped.
pub fn candidate_pools(
    template_type: TemplateType,
    value_subtype: Option<ValueSubtype>,
) -> Option<&'static [ModuleType]> {
    use ModuleType::*;
    match (template_type, value_subtype) {
        (TemplateType::Hook, None) => Some(&[Hook]),
        (TemplateType::Value, Some(ValueSubtype::Data)) => Some(&[ValorDado, ValorInsight]),
        (TemplateType::Value, Some(ValueSubtype::Insight)) => Some(&[ValorInsight, ValorDado]),
        (TemplateType::Value, Some(ValueSubtype::Solution)) => Some(&[ValorSolucao]),
        (TemplateType::Value, Some(ValueSubtype::Example)) => Some(&[ValorExemplo]),
        (TemplateType::Cta, None) => Some(&[Cta]),
        (TemplateType::Transition, None) => Some(&[Transition]),
        _ => None,
    }
}

/// Post-level attributes that steer selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionProfile {
    pub persona: String,
    pub tone: String,
    pub platform: Platform,
}

impl SelectionProfile {
    pub fn from_brief(brief: &CoherenceBrief) -> Self {
        Self {
            persona: brief.audience.persona.clone(),
            tone: brief.voice.tone.clone(),
            platform: brief.platform,
        }
    }
}

/// Outcome of selecting a template for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSelection {
    pub slide_number: u32,
    pub template_id: String,
    pub module_type: ModuleType,
    pub justification: String,
    pub confidence: f32,
    pub method: ScoringMethod,
}

/// Nearest-template matcher over a fixed library.
#[derive(Clone)]
pub struct TemplateSelector {
    library: Arc<TemplateLibrary>,
    scorer: Arc<dyn TemplateScorer>,
    config: SelectorConfig,
}

impl TemplateSelector {
    pub fn new(
        library: Arc<TemplateLibrary>,
        scorer: Arc<dyn TemplateScorer>,
        config: SelectorConfig,
    ) -> Self {
        Self {
            library,
            scorer,
            config,
        }
    }

    /// Probe the embedder and bind the matching scorer.
    pub fn with_embedder(
        library: Arc<TemplateLibrary>,
        embedder: Option<Arc<dyn EmbeddingService>>,
        config: SelectorConfig,
    ) -> Self {
        let scorer = probe_scorer(embedder, &library, &config);
        Self::new(library, scorer, config)
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn method(&self) -> ScoringMethod {
        self.scorer.method()
    }

    pub fn min_confidence(&self) -> f32 {
        self.config.min_confidence
    }

    /// Pick the best template for `slide`.
    ///
    /// Highest score wins; equal scores go to the smallest template id.
    pub fn select(&self, slide: &SlideSpec, profile: &SelectionProfile) -> Result<TemplateSelection> {
        let unmapped = || SlidecraftError::NoTemplateForType {
            template_type: slide.template_type.as_str().to_string(),
            value_subtype: slide.value_subtype.map(|v| v.as_str().to_string()),
        };
        let pools = candidate_pools(slide.template_type, slide.value_subtype).ok_or_else(unmapped)?;

        let query = self.scorer.prepare(&SlideQuery {
            description: slide.description(),
            tone: profile.tone.clone(),
        })?;

        // Library iteration is id-ordered, so a strict `>` keeps the smallest id on ties.
        let mut best: Option<(f32, &crate::templates::TextualTemplate)> = None;
        for template in self.library.iter().filter(|t| pools.contains(&t.module_type)) {
            let score = self.scorer.score(template, &query);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, template));
            }
        }
        let (confidence, template) = best.ok_or_else(unmapped)?;

        let method = self.scorer.method();
        let justification = format!(
            "{} match for persona '{}' with {} tone: {} ({})",
            method, profile.persona, profile.tone, template.function, template.module_type
        );

        log::debug!(
            "Slide {} -> {} ({:.3}, {})",
            slide.slide_number,
            template.id,
            confidence,
            method
        );

        Ok(TemplateSelection {
            slide_number: slide.slide_number,
            template_id: template.id.clone(),
            module_type: template.module_type,
            justification,
            confidence,
            method,
        })
    }

    /// Select templates for every slide and write them into the specs.
    ///
    /// Returns the numbers of slides whose confidence is at or below the
    /// configured threshold.
    pub fn select_all(
        &self,
        structure: &mut NarrativeStructure,
        profile: &SelectionProfile,
    ) -> Result<Vec<u32>> {
        let mut low_confidence = Vec::new();
        for slide in &mut structure.slides {
            let selection = self.select(slide, profile)?;
            if selection.confidence <= self.config.min_confidence {
                low_confidence.push(slide.slide_number);
            }
            slide.template_id = Some(selection.template_id);
            slide.justification = Some(selection.justification);
            slide.confidence = Some(selection.confidence);
        }
        Ok(low_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::HashingEmbedder;
    use proptest::prelude::*;

    fn semantic_selector() -> TemplateSelector {
        TemplateSelector::with_embedder(
            Arc::new(TemplateLibrary::builtin()),
            Some(Arc::new(HashingEmbedder::default())),
            SelectorConfig::default(),
        )
    }

    fn fallback_selector() -> TemplateSelector {
        TemplateSelector::with_embedder(
            Arc::new(TemplateLibrary::builtin()),
            None,
            SelectorConfig::default(),
        )
    }

    fn profile() -> SelectionProfile {
        SelectionProfile {
            persona: "Early-stage founders".into(),
            tone: "authoritative".into(),
            platform: Platform::Linkedin,
        }
    }

    fn data_slide() -> SlideSpec {
        let mut slide = SlideSpec::new(2, TemplateType::Value, Some(ValueSubtype::Data));
        slide.purpose = "Prove the scale of the problem with a statistic".into();
        slide.copy_direction = "Show a percentage statistic with a credible source".into();
        slide.key_elements = vec!["percentage".into(), "credible source".into()];
        slide
    }

    #[test]
    fn data_slide_selects_from_data_pool_semantically() {
        let selector = semantic_selector();
        let selection = selector.select(&data_slide(), &profile()).unwrap();
        assert_eq!(selection.method, ScoringMethod::Semantic);
        assert_eq!(selection.module_type, ModuleType::ValorDado);
        assert_eq!(selection.template_id, "VD01");
        assert!(selection.confidence > 0.5, "confidence {}", selection.confidence);
        assert!(selection.justification.starts_with("semantic"));
        assert!(selection.justification.contains("Early-stage founders"));
    }

    #[test]
    fn fallback_path_names_its_method() {
        let selector = fallback_selector();
        let selection = selector.select(&data_slide(), &profile()).unwrap();
        assert_eq!(selection.method, ScoringMethod::Fallback);
        assert!(selection.justification.starts_with("fallback"));
        assert!([ModuleType::ValorDado, ModuleType::ValorInsight].contains(&selection.module_type));
        assert!((0.0..=1.0).contains(&selection.confidence));
    }

    #[test]
    fn non_value_slide_with_subtype_is_rejected() {
        let selector = semantic_selector();
        let slide = SlideSpec::new(1, TemplateType::Hook, Some(ValueSubtype::Data));
        match selector.select(&slide, &profile()) {
            Err(SlidecraftError::NoTemplateForType { template_type, value_subtype }) => {
                assert_eq!(template_type, "hook");
                assert_eq!(value_subtype.as_deref(), Some("data"));
            }
            other => panic!("expected NoTemplateForType, got {:?}", other),
        }
    }

    #[test]
    fn value_slide_without_subtype_is_rejected() {
        let selector = fallback_selector();
        let slide = SlideSpec::new(3, TemplateType::Value, None);
        assert!(matches!(
            selector.select(&slide, &profile()),
            Err(SlidecraftError::NoTemplateForType { .. })
        ));
    }

    #[test]
    fn empty_pool_is_an_error() {
        let library = TemplateLibrary::from_templates(
            TemplateLibrary::builtin()
                .by_module(ModuleType::Hook)
                .cloned()
                .collect(),
        )
        .unwrap();
        let selector = TemplateSelector::with_embedder(Arc::new(library), None, SelectorConfig::default());
        let slide = SlideSpec::new(5, TemplateType::Cta, None);
        assert!(matches!(
            selector.select(&slide, &profile()),
            Err(SlidecraftError::NoTemplateForType { .. })
        ));
    }

    #[test]
    fn ties_go_to_smallest_id() {
        // An empty description scores every hook equally on the fallback path
        // (tone only), so the smallest id in the pool must win.
        let selector = fallback_selector();
        let slide = SlideSpec::new(1, TemplateType::Hook, None);
        let neutral = SelectionProfile { tone: "zzz".into(), ..profile() };
        let selection = selector.select(&slide, &neutral).unwrap();
        assert_eq!(selection.template_id, "H01");
        assert_eq!(selection.confidence, 0.0);
    }

    #[test]
    fn select_all_annotates_and_flags_low_confidence() {
        let selector = semantic_selector();
        let mut cta = SlideSpec::new(3, TemplateType::Cta, None);
        cta.purpose = "zzz".into();
        let mut structure = NarrativeStructure {
            pacing: Default::default(),
            transition_style: Default::default(),
            slides: vec![SlideSpec::new(1, TemplateType::Hook, None), data_slide(), cta],
        };
        let low = selector.select_all(&mut structure, &profile()).unwrap();
        assert!(structure.slides.iter().all(|s| s.is_selected()));
        assert!(low.contains(&3));
        assert!(!low.contains(&2));
    }

    proptest! {
        #[test]
        fn selection_is_pure_and_bounded(
            purpose in "[a-z ]{0,40}",
            direction in "[a-z ]{0,80}",
            tone in "[a-z]{0,12}",
            subtype in 0usize..4,
        ) {
            let subtypes = [ValueSubtype::Data, ValueSubtype::Insight, ValueSubtype::Solution, ValueSubtype::Example];
            let mut slide = SlideSpec::new(2, TemplateType::Value, Some(subtypes[subtype]));
            slide.purpose = purpose;
            slide.copy_direction = direction;
            let profile = SelectionProfile { tone, ..profile() };

            for selector in [semantic_selector(), fallback_selector()] {
                let a = selector.select(&slide, &profile).unwrap();
                let b = selector.select(&slide, &profile).unwrap();
                prop_assert_eq!(&a.template_id, &b.template_id);
                prop_assert_eq!(a.confidence, b.confidence);
                prop_assert!((0.0..=1.0).contains(&a.confidence));
                let method = a.method.to_string();
                prop_assert!(a.justification.contains(&method));
            }
        }
    }
}
