//! Per-post evolving state document.
//!
//! A [`CoherenceBrief`] is created once from the selected idea and then
//! enriched by later phases. Creation-time sections are plain public fields.
//! Evolutionary fields are private and written exactly once through the
//! owning phase's `enrich_*` method, guarded by [`EnrichmentStage`]'s
//! prerequisite table.

mod context;
mod sections;

pub use context::{BriefContext, Role};
pub use sections::{
    AudienceSection, BrandProfile, BrandSection, ContentSection, ContextSection, CopyGuidelines,
    CtaGuidelines, EmotionSection, PlatformConstraints, VisualPreferences, VisualSection,
    VoiceSection,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SlidecraftError};
use crate::types::{
    truncate_chars, ArticleSummary, Idea, NarrativeStructure, Pacing, Platform, PostFormat,
    TransitionStyle,
};

/// Maximum insights copied into the brief's context section.
const MAX_CONTEXT_INSIGHTS: usize = 5;
const MAX_KEYWORDS: usize = 8;
const MAX_EXCERPT_CHARS: usize = 400;

/// Enrichment points after creation, in phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStage {
    Narrative,
    Copy,
    Visual,
    Caption,
}

impl EnrichmentStage {
    pub const ALL: [EnrichmentStage; 4] = [
        EnrichmentStage::Narrative,
        EnrichmentStage::Copy,
        EnrichmentStage::Visual,
        EnrichmentStage::Caption,
    ];

    /// Stages that must be complete before this one may be written.
    pub fn prerequisites(&self) -> &'static [EnrichmentStage] {
        match self {
            EnrichmentStage::Narrative => &[],
            EnrichmentStage::Copy => &[EnrichmentStage::Narrative],
            EnrichmentStage::Visual => &[EnrichmentStage::Narrative],
            EnrichmentStage::Caption => &[
                EnrichmentStage::Narrative,
                EnrichmentStage::Copy,
                EnrichmentStage::Visual,
            ],
        }
    }

    /// Field name used in errors.
    pub fn field(&self) -> &'static str {
        match self {
            EnrichmentStage::Narrative => "narrative_structure",
            EnrichmentStage::Copy => "copy_guidelines",
            EnrichmentStage::Visual => "visual_preferences",
            EnrichmentStage::Caption => "platform_constraints",
        }
    }
}

impl std::fmt::Display for EnrichmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// The per-post state document threaded through every phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoherenceBrief {
    pub post_id: String,
    pub idea_id: String,
    pub platform: Platform,
    pub format: PostFormat,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub voice: VoiceSection,
    pub visual: VisualSection,
    pub emotions: EmotionSection,
    pub content: ContentSection,
    pub audience: AudienceSection,
    pub context: ContextSection,
    pub brand: BrandSection,

    narrative_structure: Option<NarrativeStructure>,
    narrative_pacing: Option<Pacing>,
    transition_style: Option<TransitionStyle>,
    copy_guidelines: Option<CopyGuidelines>,
    cta_guidelines: Option<CtaGuidelines>,
    visual_preferences: Option<VisualPreferences>,
    platform_constraints: Option<PlatformConstraints>,
}

impl CoherenceBrief {
    /// Create a brief from the selected idea, without a brand profile.
    pub fn create(idea: &Idea, summary: &ArticleSummary) -> Result<Self> {
        Self::create_with_profile(idea, summary, &BrandProfile::default())
    }

    /// Create a brief, taking audience and brand data from `profile` where set.
    pub fn create_with_profile(
        idea: &Idea,
        summary: &ArticleSummary,
        profile: &BrandProfile,
    ) -> Result<Self> {
        let missing = idea.missing_fields();
        if !missing.is_empty() {
            return Err(SlidecraftError::IncompleteIdea {
                idea_id: idea.id.clone(),
                missing,
            });
        }
        // Safe after the completeness check above.
        let (Some(platform), Some(tone), Some(persona), Some(hook)) =
            (idea.platform, &idea.tone, &idea.persona, &idea.hook)
        else {
            return Err(SlidecraftError::Validation("idea completeness check inconsistent".into()));
        };

        let tone = tone.trim().to_string();
        let tone_lower = tone.to_lowercase();
        let (primary, secondary) = emotions_for_tone(&tone_lower);
        let mut avoid = profile.avoid_emotions.clone();
        if avoid.is_empty() {
            avoid = vec!["fear".to_string(), "guilt".to_string()];
        }

        let insights = summary
            .insights
            .iter()
            .filter(|i| idea.insight_ids.is_empty() || idea.insight_ids.contains(&i.id))
            .take(MAX_CONTEXT_INSIGHTS)
            .cloned()
            .collect();

        let main_message = if idea.narrative_arc.trim().is_empty() {
            summary.key_points.first().cloned().unwrap_or_else(|| summary.title.clone())
        } else {
            idea.narrative_arc.trim().to_string()
        };

        let now = Utc::now();
        let brief = Self {
            post_id: Uuid::now_v7().to_string(),
            idea_id: idea.id.clone(),
            platform,
            format: idea.post_format(),
            created_at: now,
            updated_at: now,
            voice: VoiceSection {
                personality_traits: traits_for_tone(&tone_lower),
                vocabulary_level: vocabulary_for_platform(platform).to_string(),
                formality: formality_for_tone(&tone_lower).to_string(),
                tone,
            },
            visual: VisualSection {
                palette_id: profile
                    .palette_id
                    .clone()
                    .unwrap_or_else(|| palette_for_tone(&tone_lower).to_string()),
                typography_id: profile
                    .typography_id
                    .clone()
                    .unwrap_or_else(|| typography_for_platform(platform).to_string()),
                style: style_for_platform(platform).to_string(),
                mood: primary.to_string(),
            },
            emotions: EmotionSection {
                primary: primary.to_string(),
                secondary: secondary.iter().map(|s| s.to_string()).collect(),
                avoid,
            },
            content: ContentSection {
                keywords: dedup_keep_order(&summary.keywords, MAX_KEYWORDS),
                themes: summary.main_themes.clone(),
                main_message,
                angle: idea.angle.trim().to_string(),
                hook: hook.trim().to_string(),
            },
            audience: AudienceSection {
                persona: persona.trim().to_string(),
                pain_points: profile.pain_points.clone(),
                desires: profile.desires.clone(),
            },
            context: ContextSection {
                article_excerpt: summary.excerpt(3),
                insights,
            },
            brand: BrandSection {
                values: profile.values.clone(),
                assets: profile.assets.clone(),
            },
            narrative_structure: None,
            narrative_pacing: None,
            transition_style: None,
            copy_guidelines: None,
            cta_guidelines: None,
            visual_preferences: None,
            platform_constraints: None,
        };

        log::debug!("Created brief {} from idea {}", brief.post_id, brief.idea_id);
        Ok(brief)
    }

    /// Fill blank creation-time fields from the source article and the
    /// tone/platform tables. Returns the names of the fields it set.
    ///
    /// Only allowed before the first enrichment.
    pub fn fill_creation_gaps(&mut self, article_title: &str, article_text: &str) -> Result<Vec<&'static str>> {
        if !self.completed_stages().is_empty() {
            return Err(SlidecraftError::OutOfOrderEnrichment {
                field: "creation sections".to_string(),
                reason: "brief has already been enriched".to_string(),
            });
        }

        let tone = self.voice.tone.to_lowercase();
        let lead = first_sentence(article_text);
        let title = article_title.trim();
        let mut filled = Vec::new();

        if self.voice.formality.trim().is_empty() {
            self.voice.formality = formality_for_tone(&tone).to_string();
            filled.push("voice.formality");
        }
        if self.visual.palette_id.trim().is_empty() {
            self.visual.palette_id = palette_for_tone(&tone).to_string();
            filled.push("visual.palette_id");
        }
        if self.visual.typography_id.trim().is_empty() {
            self.visual.typography_id = typography_for_platform(self.platform).to_string();
            filled.push("visual.typography_id");
        }
        if self.emotions.primary.trim().is_empty() {
            self.emotions.primary = emotions_for_tone(&tone).0.to_string();
            filled.push("emotions.primary");
        }
        if self.content.main_message.trim().is_empty() {
            let message = if title.is_empty() { lead.clone() } else { title.to_string() };
            if !message.is_empty() {
                self.content.main_message = message;
                filled.push("content.main_message");
            }
        }
        if self.context.article_excerpt.trim().is_empty() {
            let excerpt = [title, lead.as_str()]
                .iter()
                .filter(|p| !p.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(". ");
            if !excerpt.is_empty() {
                self.context.article_excerpt = truncate_chars(&excerpt, MAX_EXCERPT_CHARS);
                filled.push("context.article_excerpt");
            }
        }

        if !filled.is_empty() {
            self.updated_at = Utc::now();
            log::debug!("Brief {}: filled {}", self.post_id, filled.join(", "));
        }
        Ok(filled)
    }

    // === Enrichment ===

    /// Attach the narrative structure along with its pacing and transition style.
    pub fn enrich_narrative(&mut self, structure: NarrativeStructure) -> Result<()> {
        self.check_stage(EnrichmentStage::Narrative)?;
        self.narrative_pacing = Some(structure.pacing);
        self.transition_style = Some(structure.transition_style);
        self.narrative_structure = Some(structure);
        self.touch();
        Ok(())
    }

    pub fn enrich_copy(&mut self, copy: CopyGuidelines, cta: CtaGuidelines) -> Result<()> {
        self.check_stage(EnrichmentStage::Copy)?;
        self.copy_guidelines = Some(copy);
        self.cta_guidelines = Some(cta);
        self.touch();
        Ok(())
    }

    pub fn enrich_visual(&mut self, preferences: VisualPreferences) -> Result<()> {
        self.check_stage(EnrichmentStage::Visual)?;
        self.visual_preferences = Some(preferences);
        self.touch();
        Ok(())
    }

    pub fn enrich_caption(&mut self, constraints: PlatformConstraints) -> Result<()> {
        self.check_stage(EnrichmentStage::Caption)?;
        self.platform_constraints = Some(constraints);
        self.touch();
        Ok(())
    }

    fn check_stage(&self, stage: EnrichmentStage) -> Result<()> {
        if self.is_stage_complete(stage) {
            return Err(SlidecraftError::OutOfOrderEnrichment {
                field: stage.field().to_string(),
                reason: "already set".to_string(),
            });
        }
        let missing: Vec<&str> = stage
            .prerequisites()
            .iter()
            .filter(|p| !self.is_stage_complete(**p))
            .map(|p| p.field())
            .collect();
        if !missing.is_empty() {
            return Err(SlidecraftError::OutOfOrderEnrichment {
                field: stage.field().to_string(),
                reason: format!("requires {} first", missing.join(", ")),
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // === State queries ===

    pub fn is_stage_complete(&self, stage: EnrichmentStage) -> bool {
        match stage {
            EnrichmentStage::Narrative => self.narrative_structure.is_some(),
            EnrichmentStage::Copy => self.copy_guidelines.is_some(),
            EnrichmentStage::Visual => self.visual_preferences.is_some(),
            EnrichmentStage::Caption => self.platform_constraints.is_some(),
        }
    }

    /// Completed enrichment stages, derived from the non-null fields.
    pub fn completed_stages(&self) -> Vec<EnrichmentStage> {
        EnrichmentStage::ALL
            .into_iter()
            .filter(|s| self.is_stage_complete(*s))
            .collect()
    }

    /// Names of the non-null evolutionary fields.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.narrative_structure.is_some() {
            fields.push("narrative_structure");
        }
        if self.narrative_pacing.is_some() {
            fields.push("narrative_pacing");
        }
        if self.transition_style.is_some() {
            fields.push("transition_style");
        }
        if self.copy_guidelines.is_some() {
            fields.push("copy_guidelines");
        }
        if self.cta_guidelines.is_some() {
            fields.push("cta_guidelines");
        }
        if self.visual_preferences.is_some() {
            fields.push("visual_preferences");
        }
        if self.platform_constraints.is_some() {
            fields.push("platform_constraints");
        }
        fields
    }

    /// Check the phase-ordering invariant on a brief that did not come
    /// through the enrichment methods (e.g. one loaded from a document).
    pub fn validate_ordering(&self) -> Result<()> {
        for stage in EnrichmentStage::ALL {
            if !self.is_stage_complete(stage) {
                continue;
            }
            if let Some(missing) = stage.prerequisites().iter().find(|p| !self.is_stage_complete(**p)) {
                return Err(SlidecraftError::OutOfOrderEnrichment {
                    field: stage.field().to_string(),
                    reason: format!("set without {}", missing.field()),
                });
            }
        }
        let narrative_fields = [
            self.narrative_structure.is_some(),
            self.narrative_pacing.is_some(),
            self.transition_style.is_some(),
        ];
        let copy_fields = [self.copy_guidelines.is_some(), self.cta_guidelines.is_some()];
        if narrative_fields.iter().any(|f| *f != narrative_fields[0]) {
            return Err(SlidecraftError::OutOfOrderEnrichment {
                field: "narrative_structure".into(),
                reason: "narrative fields partially set".into(),
            });
        }
        if copy_fields[0] != copy_fields[1] {
            return Err(SlidecraftError::OutOfOrderEnrichment {
                field: "copy_guidelines".into(),
                reason: "copy and cta guidelines partially set".into(),
            });
        }
        Ok(())
    }

    // === Accessors ===

    pub fn narrative_structure(&self) -> Option<&NarrativeStructure> {
        self.narrative_structure.as_ref()
    }

    pub fn narrative_pacing(&self) -> Option<Pacing> {
        self.narrative_pacing
    }

    pub fn transition_style(&self) -> Option<TransitionStyle> {
        self.transition_style
    }

    pub fn copy_guidelines(&self) -> Option<&CopyGuidelines> {
        self.copy_guidelines.as_ref()
    }

    pub fn cta_guidelines(&self) -> Option<&CtaGuidelines> {
        self.cta_guidelines.as_ref()
    }

    pub fn visual_preferences(&self) -> Option<&VisualPreferences> {
        self.visual_preferences.as_ref()
    }

    pub fn platform_constraints(&self) -> Option<&PlatformConstraints> {
        self.platform_constraints.as_ref()
    }

    // === Documents ===

    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Load a brief from its document form, rejecting out-of-order state.
    pub fn from_document(doc: serde_json::Value) -> Result<Self> {
        let brief: Self = serde_json::from_value(doc)?;
        brief.validate_ordering()?;
        Ok(brief)
    }
}

// ── Creation-time derivation tables ───────────────────────────────────────────

fn emotions_for_tone(tone: &str) -> (&'static str, &'static [&'static str]) {
    if contains_any(tone, &["urgent", "provocative", "bold"]) {
        ("urgency", &["curiosity", "determination"])
    } else if contains_any(tone, &["inspir", "motivat", "empower"]) {
        ("inspiration", &["hope", "confidence"])
    } else if contains_any(tone, &["playful", "humor", "fun", "casual"]) {
        ("delight", &["curiosity", "belonging"])
    } else if contains_any(tone, &["empath", "warm", "caring"]) {
        ("empathy", &["trust", "relief"])
    } else {
        ("trust", &["curiosity", "clarity"])
    }
}

fn traits_for_tone(tone: &str) -> Vec<String> {
    let traits: &[&str] = if contains_any(tone, &["authoritative", "expert", "professional"]) {
        &["credible", "precise", "confident"]
    } else if contains_any(tone, &["playful", "humor", "fun", "casual"]) {
        &["witty", "approachable", "light"]
    } else if contains_any(tone, &["inspir", "motivat", "empower"]) {
        &["energetic", "optimistic", "direct"]
    } else if contains_any(tone, &["empath", "warm", "caring"]) {
        &["warm", "patient", "reassuring"]
    } else {
        &["clear", "helpful", "grounded"]
    };
    traits.iter().map(|t| t.to_string()).collect()
}

fn formality_for_tone(tone: &str) -> &'static str {
    if contains_any(tone, &["formal", "professional", "authoritative", "academic"]) {
        "formal"
    } else if contains_any(tone, &["casual", "playful", "humor", "fun", "conversational"]) {
        "informal"
    } else {
        "neutral"
    }
}

fn palette_for_tone(tone: &str) -> &'static str {
    if contains_any(tone, &["urgent", "provocative", "bold"]) {
        "palette-high-contrast"
    } else if contains_any(tone, &["playful", "humor", "fun"]) {
        "palette-vibrant"
    } else if contains_any(tone, &["empath", "warm", "caring"]) {
        "palette-warm"
    } else {
        "palette-brand-neutral"
    }
}

fn vocabulary_for_platform(platform: Platform) -> &'static str {
    match platform {
        Platform::Linkedin => "professional",
        Platform::Instagram => "accessible",
        Platform::Tiktok => "colloquial",
        Platform::Twitter => "concise",
    }
}

fn typography_for_platform(platform: Platform) -> &'static str {
    match platform {
        Platform::Linkedin => "type-editorial",
        Platform::Instagram | Platform::Tiktok => "type-display-bold",
        Platform::Twitter => "type-compact",
    }
}

fn style_for_platform(platform: Platform) -> &'static str {
    match platform {
        Platform::Linkedin => "clean editorial",
        Platform::Instagram => "bold minimal",
        Platform::Tiktok => "native vertical",
        Platform::Twitter => "card",
    }
}

/// Text up to and including the first sentence terminator.
fn first_sentence(text: &str) -> String {
    let text = text.trim();
    match text.find(|c: char| matches!(c, '.' | '!' | '?')) {
        Some(end) => text[..=end].trim().to_string(),
        None => text.lines().next().unwrap_or_default().trim().to_string(),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn dedup_keep_order(items: &[String], limit: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .take(limit)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Insight, SlideSpec, TemplateType, ValueSubtype};
    use proptest::prelude::*;

    pub(crate) fn sample_idea() -> Idea {
        Idea {
            id: "idea-1".into(),
            platform: Some(Platform::Instagram),
            format: None,
            tone: Some("Authoritative".into()),
            persona: Some("Early-stage founders".into()),
            angle: "Most startups die from focus, not money".into(),
            hook: Some("90% of startups fail. Here's the real reason.".into()),
            narrative_arc: "Problem, evidence, reframe, action".into(),
            insight_ids: vec!["ins-1".into()],
            estimated_slides: Some(6),
            confidence: 0.82,
        }
    }

    pub(crate) fn sample_summary() -> ArticleSummary {
        ArticleSummary {
            title: "Why startups fail".into(),
            key_points: vec!["Focus beats funding".into(), "Distribution is underrated".into()],
            insights: vec![
                Insight { id: "ins-1".into(), text: "73% of failed startups cite lack of focus".into(), source: Some("CB Insights".into()) },
                Insight { id: "ins-2".into(), text: "Unrelated".into(), source: None },
            ],
            main_themes: vec!["focus".into(), "startups".into()],
            keywords: vec!["focus".into(), "startup".into(), "Focus".into(), "growth".into()],
        }
    }

    pub(crate) fn sample_structure() -> NarrativeStructure {
        NarrativeStructure {
            pacing: Pacing::Fast,
            transition_style: TransitionStyle::Dramatic,
            slides: vec![
                SlideSpec::new(1, TemplateType::Hook, None),
                SlideSpec::new(2, TemplateType::Value, Some(ValueSubtype::Data)),
                SlideSpec::new(3, TemplateType::Cta, None),
            ],
        }
    }

    pub(crate) fn sample_brief() -> CoherenceBrief {
        CoherenceBrief::create(&sample_idea(), &sample_summary()).unwrap()
    }

    fn fully_enriched() -> CoherenceBrief {
        let mut brief = sample_brief();
        brief.enrich_narrative(sample_structure()).unwrap();
        brief.enrich_copy(CopyGuidelines::default(), CtaGuidelines::default()).unwrap();
        brief.enrich_visual(VisualPreferences::default()).unwrap();
        brief.enrich_caption(PlatformConstraints::for_platform(Platform::Instagram)).unwrap();
        brief
    }

    #[test]
    fn create_populates_creation_sections() {
        let brief = sample_brief();
        assert_eq!(brief.idea_id, "idea-1");
        assert_eq!(brief.voice.tone, "Authoritative");
        assert_eq!(brief.voice.formality, "formal");
        assert_eq!(brief.audience.persona, "Early-stage founders");
        assert_eq!(brief.content.keywords, vec!["focus", "startup", "growth"]);
        assert_eq!(brief.context.insights.len(), 1);
        assert_eq!(brief.content.main_message, "Problem, evidence, reframe, action");
        assert!(brief.completed_stages().is_empty());
        assert!(brief.populated_fields().is_empty());
    }

    #[test]
    fn create_rejects_idea_missing_persona() {
        let mut idea = sample_idea();
        idea.persona = None;
        match CoherenceBrief::create(&idea, &sample_summary()) {
            Err(SlidecraftError::IncompleteIdea { missing, .. }) => assert_eq!(missing, vec!["persona"]),
            other => panic!("expected IncompleteIdea, got {:?}", other),
        }
    }

    #[test]
    fn enrich_copy_before_narrative_is_out_of_order() {
        let mut brief = sample_brief();
        let err = brief
            .enrich_copy(CopyGuidelines::default(), CtaGuidelines::default())
            .unwrap_err();
        assert!(matches!(err, SlidecraftError::OutOfOrderEnrichment { ref field, .. } if field == "copy_guidelines"));
        assert!(brief.copy_guidelines().is_none());
    }

    #[test]
    fn caption_requires_both_phase_four_stages() {
        let mut brief = sample_brief();
        brief.enrich_narrative(sample_structure()).unwrap();
        brief.enrich_copy(CopyGuidelines::default(), CtaGuidelines::default()).unwrap();
        let err = brief
            .enrich_caption(PlatformConstraints::for_platform(Platform::Instagram))
            .unwrap_err();
        assert!(err.to_string().contains("visual_preferences"));
    }

    #[test]
    fn narrative_sets_all_three_fields() {
        let mut brief = sample_brief();
        brief.enrich_narrative(sample_structure()).unwrap();
        assert_eq!(brief.narrative_pacing(), Some(Pacing::Fast));
        assert_eq!(brief.transition_style(), Some(TransitionStyle::Dramatic));
        assert_eq!(
            brief.populated_fields(),
            vec!["narrative_structure", "narrative_pacing", "transition_style"]
        );
    }

    #[test]
    fn document_round_trip_preserves_enrichment_state() {
        let brief = fully_enriched();
        let doc = brief.to_document().unwrap();
        let loaded = CoherenceBrief::from_document(doc).unwrap();
        assert_eq!(loaded, brief);
        assert_eq!(loaded.populated_fields(), brief.populated_fields());
        assert_eq!(loaded.completed_stages(), EnrichmentStage::ALL.to_vec());
    }

    #[test]
    fn from_document_rejects_out_of_order_state() {
        let mut doc = sample_brief().to_document().unwrap();
        doc["copy_guidelines"] = serde_json::to_value(CopyGuidelines::default()).unwrap();
        doc["cta_guidelines"] = serde_json::to_value(CtaGuidelines::default()).unwrap();
        assert!(matches!(
            CoherenceBrief::from_document(doc),
            Err(SlidecraftError::OutOfOrderEnrichment { .. })
        ));
    }

    #[test]
    fn thin_summary_gaps_are_filled_from_the_article() {
        let mut idea = sample_idea();
        idea.narrative_arc = String::new();
        let mut brief = CoherenceBrief::create(&idea, &ArticleSummary::default()).unwrap();
        brief.visual.palette_id.clear();
        assert!(brief.content.main_message.is_empty());
        assert!(brief.context.article_excerpt.is_empty());

        let filled = brief
            .fill_creation_gaps("Why startups fail", "Most startups fail from lack of focus. Funding is rarely it.")
            .unwrap();
        assert_eq!(filled, vec!["visual.palette_id", "content.main_message", "context.article_excerpt"]);
        assert_eq!(brief.visual.palette_id, palette_for_tone("authoritative"));
        assert_eq!(brief.content.main_message, "Why startups fail");
        assert_eq!(
            brief.context.article_excerpt,
            "Why startups fail. Most startups fail from lack of focus."
        );

        // Nothing left to fill.
        assert!(brief.fill_creation_gaps("Other", "Other text.").unwrap().is_empty());
        assert_eq!(brief.content.main_message, "Why startups fail");

        brief.enrich_narrative(sample_structure()).unwrap();
        assert!(matches!(
            brief.fill_creation_gaps("Why startups fail", ""),
            Err(SlidecraftError::OutOfOrderEnrichment { .. })
        ));
    }

    fn apply(brief: &mut CoherenceBrief, stage: EnrichmentStage) -> Result<()> {
        match stage {
            EnrichmentStage::Narrative => brief.enrich_narrative(sample_structure()),
            EnrichmentStage::Copy => brief.enrich_copy(CopyGuidelines::default(), CtaGuidelines::default()),
            EnrichmentStage::Visual => brief.enrich_visual(VisualPreferences::default()),
            EnrichmentStage::Caption => {
                brief.enrich_caption(PlatformConstraints::for_platform(Platform::Linkedin))
            }
        }
    }

    proptest! {
        /// Any sequence of enrichment calls keeps the ordering invariant, and a
        /// stage that is already set always rejects a second write.
        #[test]
        fn enrichment_is_write_once_and_ordered(seq in prop::collection::vec(0usize..4, 1..12)) {
            let mut brief = sample_brief();
            for idx in seq {
                let stage = EnrichmentStage::ALL[idx];
                let was_set = brief.is_stage_complete(stage);
                let before = brief.populated_fields();
                let result = apply(&mut brief, stage);
                if was_set {
                    let rejected = matches!(result, Err(SlidecraftError::OutOfOrderEnrichment { .. }));
                    prop_assert!(rejected);
                    prop_assert_eq!(brief.populated_fields(), before);
                }
                prop_assert!(brief.validate_ordering().is_ok());
            }
        }
    }
}
