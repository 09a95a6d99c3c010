use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::brief::{CoherenceBrief, PlatformConstraints};
use crate::types::{Caption, Idea, NarrativeStructure, PostFormat, SlideContent, TemplateType, VisualSpec};

/// Weights of the aggregate quality score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityWeights {
    pub coherence: f32,
    pub visual: f32,
    pub textual: f32,
    pub completeness: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            coherence: 0.30,
            visual: 0.20,
            textual: 0.30,
            completeness: 0.20,
        }
    }
}

/// Configuration for the phase gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    pub min_ideas: usize,
    /// Minimum slides for a carousel. Single-image posts need exactly one.
    pub min_slides: usize,
    /// Template confidence must be strictly above this.
    pub min_confidence: f32,
    /// Quality score must be strictly above this.
    pub quality_threshold: f32,
    pub quality_weights: QualityWeights,
    /// Keys that mark copy leaking into a visual spec.
    pub text_keys: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_ideas: 3,
            min_slides: 5,
            min_confidence: 0.5,
            quality_threshold: 0.7,
            quality_weights: QualityWeights::default(),
            text_keys: [
                "text", "headline", "title", "subtitle", "copy", "caption", "body", "cta", "quote",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let w = &self.quality_weights;
        if ((w.coherence + w.visual + w.textual + w.completeness) - 1.0).abs() > 1e-3 {
            errors.push("quality weights must sum to 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            errors.push("quality_threshold must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            errors.push("min_confidence must be within [0, 1]".to_string());
        }
        if self.min_slides == 0 {
            errors.push("min_slides must be greater than 0".to_string());
        }
        errors
    }
}

/// Which gate check produced a rejection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GateCheck {
    IdeaCount,
    IdeaDistinct,
    BriefField,
    SlideCount,
    SlideNumbering,
    SlideSubtype,
    TemplateMissing,
    LowConfidence,
    MissingContent,
    SlotLength,
    VisualText,
    CaptionLength,
    HashtagLimit,
}

impl std::fmt::Display for GateCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GateCheck::IdeaCount => "idea_count",
            GateCheck::IdeaDistinct => "idea_distinct",
            GateCheck::BriefField => "brief_field",
            GateCheck::SlideCount => "slide_count",
            GateCheck::SlideNumbering => "slide_numbering",
            GateCheck::SlideSubtype => "slide_subtype",
            GateCheck::TemplateMissing => "template_missing",
            GateCheck::LowConfidence => "low_confidence",
            GateCheck::MissingContent => "missing_content",
            GateCheck::SlotLength => "slot_length",
            GateCheck::VisualText => "visual_text",
            GateCheck::CaptionLength => "caption_length",
            GateCheck::HashtagLimit => "hashtag_limit",
        };
        f.write_str(s)
    }
}

/// Rejection details returned when a gate check fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateRejection {
    pub check: GateCheck,
    pub reason: String,
    pub suggestion: String,
    /// Slide the rejection refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<u32>,
}

impl GateRejection {
    fn new(check: GateCheck, reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            check,
            reason: reason.into(),
            suggestion: suggestion.into(),
            slide_number: None,
        }
    }

    fn on_slide(mut self, slide_number: u32) -> Self {
        self.slide_number = Some(slide_number);
        self
    }
}

/// Result of running one phase gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateResult {
    Pass,
    Reject(Vec<GateRejection>),
}

impl GateResult {
    fn from_rejections(rejections: Vec<GateRejection>) -> Self {
        if rejections.is_empty() {
            GateResult::Pass
        } else {
            GateResult::Reject(rejections)
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, GateResult::Pass)
    }

    pub fn rejections(&self) -> &[GateRejection] {
        match self {
            GateResult::Pass => &[],
            GateResult::Reject(r) => r,
        }
    }

    pub fn reasons(&self) -> Vec<String> {
        self.rejections()
            .iter()
            .map(|r| format!("{}: {}", r.check, r.reason))
            .collect()
    }

    /// Feedback note handed to the generator on retry.
    pub fn feedback(&self) -> String {
        self.rejections()
            .iter()
            .map(|r| format!("- [{}] {} Fix: {}", r.check, r.reason, r.suggestion))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Slides mentioned by any rejection.
    pub fn slides(&self) -> Vec<u32> {
        let mut slides: Vec<u32> = self.rejections().iter().filter_map(|r| r.slide_number).collect();
        slides.sort_unstable();
        slides.dedup();
        slides
    }
}

/// Aggregate quality of a finished post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityScore {
    pub coherence: f32,
    pub visual: f32,
    pub textual: f32,
    pub completeness: f32,
    pub overall: f32,
    pub passed: bool,
}

/// Stateless phase gate. Every check is a pure function of its inputs.
pub struct PhaseGate;

impl PhaseGate {
    /// Ideation: enough ideas, pairwise distinct by angle and hook.
    pub fn check_ideation(ideas: &[Idea], config: &GateConfig) -> GateResult {
        let mut rejections = Vec::new();
        if ideas.len() < config.min_ideas {
            rejections.push(GateRejection::new(
                GateCheck::IdeaCount,
                format!("Only {} ideas generated, minimum {}", ideas.len(), config.min_ideas),
                format!("Generate at least {} ideas with different angles", config.min_ideas),
            ));
        }

        let mut seen = HashSet::new();
        for idea in ideas {
            let key = (
                normalize(&idea.angle),
                normalize(idea.hook.as_deref().unwrap_or_default()),
            );
            if !seen.insert(key) {
                rejections.push(GateRejection::new(
                    GateCheck::IdeaDistinct,
                    format!("Idea {} repeats the angle and hook of an earlier idea", idea.id),
                    "Give every idea its own angle and hook",
                ));
            }
        }
        GateResult::from_rejections(rejections)
    }

    /// Configuration: every required creation-time field is filled.
    pub fn check_configuration(brief: &CoherenceBrief) -> GateResult {
        let required = [
            ("post_id", brief.post_id.as_str()),
            ("voice.tone", brief.voice.tone.as_str()),
            ("voice.formality", brief.voice.formality.as_str()),
            ("visual.palette_id", brief.visual.palette_id.as_str()),
            ("visual.typography_id", brief.visual.typography_id.as_str()),
            ("emotions.primary", brief.emotions.primary.as_str()),
            ("content.main_message", brief.content.main_message.as_str()),
            ("content.hook", brief.content.hook.as_str()),
            ("audience.persona", brief.audience.persona.as_str()),
            ("context.article_excerpt", brief.context.article_excerpt.as_str()),
        ];
        let rejections = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| {
                GateRejection::new(
                    GateCheck::BriefField,
                    format!("Required brief field {} is empty", name),
                    "Fill the field from the idea or the article summary",
                )
            })
            .collect();
        GateResult::from_rejections(rejections)
    }

    /// Post creation, before selection: slide count, numbering and typing.
    pub fn check_structure(
        structure: &NarrativeStructure,
        format: PostFormat,
        config: &GateConfig,
    ) -> GateResult {
        let mut rejections = Vec::new();
        let count = structure.slides.len();
        match format {
            PostFormat::SingleImage if count != 1 => rejections.push(GateRejection::new(
                GateCheck::SlideCount,
                format!("Single-image post has {} slides", count),
                "Produce exactly one slide",
            )),
            PostFormat::Carousel if count < config.min_slides => rejections.push(GateRejection::new(
                GateCheck::SlideCount,
                format!("Carousel has {} slides, minimum {}", count, config.min_slides),
                format!("Plan at least {} slides", config.min_slides),
            )),
            _ => {}
        }

        for (idx, slide) in structure.slides.iter().enumerate() {
            let expected = idx as u32 + 1;
            if slide.slide_number != expected {
                rejections.push(
                    GateRejection::new(
                        GateCheck::SlideNumbering,
                        format!("Slide at position {} is numbered {}", expected, slide.slide_number),
                        "Number slides 1..n without gaps",
                    )
                    .on_slide(slide.slide_number),
                );
            }
            match (slide.template_type, slide.value_subtype) {
                (TemplateType::Value, None) => rejections.push(
                    GateRejection::new(
                        GateCheck::SlideSubtype,
                        format!("Value slide {} has no value_subtype", slide.slide_number),
                        "Set value_subtype to one of data, insight, solution, example",
                    )
                    .on_slide(slide.slide_number),
                ),
                (t, Some(_)) if t != TemplateType::Value => rejections.push(
                    GateRejection::new(
                        GateCheck::SlideSubtype,
                        format!("{} slide {} must not carry a value_subtype", t.as_str(), slide.slide_number),
                        "Remove value_subtype from non-value slides",
                    )
                    .on_slide(slide.slide_number),
                ),
                _ => {}
            }
        }
        GateResult::from_rejections(rejections)
    }

    /// Post creation, after selection: every slide has a confident template.
    pub fn check_selection(structure: &NarrativeStructure, config: &GateConfig) -> GateResult {
        let mut rejections = Vec::new();
        for slide in &structure.slides {
            match (&slide.template_id, slide.confidence) {
                (Some(_), Some(confidence)) if confidence > config.min_confidence => {}
                (Some(id), Some(confidence)) => rejections.push(
                    GateRejection::new(
                        GateCheck::LowConfidence,
                        format!(
                            "Slide {} matched {} with confidence {:.2}",
                            slide.slide_number, id, confidence
                        ),
                        "Make the purpose and copy_direction more specific to the slide's narrative job",
                    )
                    .on_slide(slide.slide_number),
                ),
                _ => rejections.push(
                    GateRejection::new(
                        GateCheck::TemplateMissing,
                        format!("Slide {} has no template", slide.slide_number),
                        "Run template selection",
                    )
                    .on_slide(slide.slide_number),
                ),
            }
        }
        GateResult::from_rejections(rejections)
    }

    /// Slide generation: slots within limits, visuals free of copy.
    pub fn check_slides(
        structure: &NarrativeStructure,
        contents: &[SlideContent],
        visuals: &[VisualSpec],
        config: &GateConfig,
    ) -> GateResult {
        let mut rejections = Vec::new();
        let contents: BTreeMap<u32, &SlideContent> =
            contents.iter().map(|c| (c.slide_number, c)).collect();
        let visuals: BTreeMap<u32, &VisualSpec> = visuals.iter().map(|v| (v.slide_number, v)).collect();

        for slide in &structure.slides {
            let n = slide.slide_number;
            match contents.get(&n) {
                None => rejections.push(
                    GateRejection::new(
                        GateCheck::MissingContent,
                        format!("Slide {} has no copy", n),
                        "Generate copy for every slide",
                    )
                    .on_slide(n),
                ),
                Some(content) => {
                    for (slot, max) in &slide.content_slots {
                        let Some(text) = content.slots.get(slot).filter(|t| !t.trim().is_empty()) else {
                            rejections.push(
                                GateRejection::new(
                                    GateCheck::MissingContent,
                                    format!("Slide {} slot '{}' is empty", n, slot),
                                    format!("Write copy for the '{}' slot", slot),
                                )
                                .on_slide(n),
                            );
                            continue;
                        };
                        let len = text.chars().count();
                        if len > *max {
                            rejections.push(
                                GateRejection::new(
                                    GateCheck::SlotLength,
                                    format!("Slide {} slot '{}' has {} chars, limit {}", n, slot, len, max),
                                    format!("Shorten '{}' to at most {} characters", slot, max),
                                )
                                .on_slide(n),
                            );
                        }
                    }
                }
            }

            match visuals.get(&n) {
                None => rejections.push(
                    GateRejection::new(
                        GateCheck::MissingContent,
                        format!("Slide {} has no visual spec", n),
                        "Describe the visual for every slide",
                    )
                    .on_slide(n),
                ),
                Some(visual) => {
                    let leaked = text_keys(visual, config);
                    if !leaked.is_empty() {
                        rejections.push(
                            GateRejection::new(
                                GateCheck::VisualText,
                                format!("Visual spec for slide {} contains text fields: {}", n, leaked.join(", ")),
                                "Describe imagery only; copy lives in the slide content",
                            )
                            .on_slide(n),
                        );
                    }
                }
            }
        }
        GateResult::from_rejections(rejections)
    }

    /// Finalization: caption fits the platform.
    pub fn check_caption(caption: &Caption, constraints: &PlatformConstraints) -> GateResult {
        let mut rejections = Vec::new();
        let len = caption.char_count();
        if len > constraints.caption_max_chars {
            rejections.push(GateRejection::new(
                GateCheck::CaptionLength,
                format!(
                    "Caption has {} chars, {} limit is {}",
                    len, constraints.platform, constraints.caption_max_chars
                ),
                format!("Cut the caption to under {} characters", constraints.caption_max_chars),
            ));
        }
        if caption.hashtags.len() > constraints.hashtag_limit {
            rejections.push(GateRejection::new(
                GateCheck::HashtagLimit,
                format!(
                    "Caption has {} hashtags, limit {}",
                    caption.hashtags.len(),
                    constraints.hashtag_limit
                ),
                format!("Keep the {} most relevant hashtags", constraints.hashtag_limit),
            ));
        }
        GateResult::from_rejections(rejections)
    }

    /// Weighted quality of the finished post.
    pub fn quality_score(
        brief: &CoherenceBrief,
        contents: &[SlideContent],
        visuals: &[VisualSpec],
        caption: &Caption,
        config: &GateConfig,
    ) -> QualityScore {
        let slides = brief.narrative_structure().map(|s| s.slides.as_slice()).unwrap_or_default();
        let n = slides.len().max(1) as f32;

        // Coherence: brief keywords echoed in the copy, plus template fit.
        let mut corpus = caption.full_text().to_lowercase();
        for content in contents {
            for text in content.slots.values() {
                corpus.push(' ');
                corpus.push_str(&text.to_lowercase());
            }
        }
        let keywords = &brief.content.keywords;
        let keyword_coverage = if keywords.is_empty() {
            1.0
        } else {
            keywords.iter().filter(|k| corpus.contains(&k.to_lowercase())).count() as f32
                / keywords.len() as f32
        };
        let mean_confidence =
            slides.iter().map(|s| s.confidence.unwrap_or(0.0)).sum::<f32>() / n;
        let coherence = 0.5 * keyword_coverage + 0.5 * mean_confidence;

        // Textual: share of slots within their limits.
        let mut slot_total = 0usize;
        let mut slot_ok = 0usize;
        for slide in slides {
            let Some(content) = contents.iter().find(|c| c.slide_number == slide.slide_number) else {
                continue;
            };
            for (slot, text) in &content.slots {
                slot_total += 1;
                let within = slide
                    .content_slots
                    .get(slot)
                    .map_or(true, |max| text.chars().count() <= *max);
                if within && !text.trim().is_empty() {
                    slot_ok += 1;
                }
            }
        }
        let textual = ratio(slot_ok, slot_total);

        // Visual: specs that describe imagery and carry no copy.
        let visual_ok = visuals
            .iter()
            .filter(|v| !v.description.trim().is_empty() && text_keys(v, config).is_empty())
            .count();
        let visual = ratio(visual_ok, visuals.len());

        // Completeness: every slide has copy, visual and template; caption present.
        let has = |pred: &dyn Fn(u32) -> bool| {
            slides.iter().filter(|s| pred(s.slide_number)).count() as f32 / n
        };
        let with_copy = has(&|k| contents.iter().any(|c| c.slide_number == k));
        let with_visual = has(&|k| visuals.iter().any(|v| v.slide_number == k));
        let with_template = slides.iter().filter(|s| s.template_id.is_some()).count() as f32 / n;
        let with_caption = if caption.text.trim().is_empty() { 0.0 } else { 1.0 };
        let completeness = if slides.is_empty() {
            0.0
        } else {
            (with_copy + with_visual + with_template + with_caption) / 4.0
        };

        let w = &config.quality_weights;
        let overall = (w.coherence * coherence
            + w.visual * visual
            + w.textual * textual
            + w.completeness * completeness)
            .clamp(0.0, 1.0);

        QualityScore {
            coherence,
            visual,
            textual,
            completeness,
            overall,
            passed: overall > config.quality_threshold,
        }
    }
}

/// Text-bearing keys present in a visual spec.
pub fn text_keys(visual: &VisualSpec, config: &GateConfig) -> Vec<String> {
    visual
        .extra
        .keys()
        .filter(|k| config.text_keys.iter().any(|t| t.eq_ignore_ascii_case(k)))
        .cloned()
        .collect()
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::tests::sample_brief;
    use crate::brief::{CopyGuidelines, CtaGuidelines};
    use crate::types::{Pacing, Platform, SlideSpec, TransitionStyle, ValueSubtype};

    fn idea(id: &str, angle: &str, hook: &str) -> Idea {
        Idea {
            id: id.into(),
            angle: angle.into(),
            hook: Some(hook.into()),
            ..Default::default()
        }
    }

    fn carousel(n: u32) -> NarrativeStructure {
        let slides = (1..=n)
            .map(|i| {
                let (t, v) = match i {
                    1 => (TemplateType::Hook, None),
                    i if i == n => (TemplateType::Cta, None),
                    _ => (TemplateType::Value, Some(ValueSubtype::Insight)),
                };
                let mut s = SlideSpec::new(i, t, v);
                s.content_slots.insert("headline".into(), 40);
                s
            })
            .collect();
        NarrativeStructure {
            pacing: Pacing::Moderate,
            transition_style: TransitionStyle::Smooth,
            slides,
        }
    }

    #[test]
    fn ideation_rejects_too_few_ideas() {
        let ideas = vec![idea("a", "focus", "h1"), idea("b", "money", "h2")];
        let result = PhaseGate::check_ideation(&ideas, &GateConfig::default());
        assert_eq!(result.rejections().len(), 1);
        assert_eq!(result.rejections()[0].check, GateCheck::IdeaCount);
    }

    #[test]
    fn ideation_rejects_duplicates_case_insensitively() {
        let ideas = vec![
            idea("a", "Focus wins", "Stop"),
            idea("b", "focus  wins", "stop"),
            idea("c", "Money", "Go"),
        ];
        let result = PhaseGate::check_ideation(&ideas, &GateConfig::default());
        assert!(!result.is_pass());
        assert_eq!(result.rejections()[0].check, GateCheck::IdeaDistinct);
    }

    #[test]
    fn ideation_passes_three_distinct() {
        let ideas = vec![idea("a", "x", "1"), idea("b", "y", "2"), idea("c", "x", "3")];
        assert!(PhaseGate::check_ideation(&ideas, &GateConfig::default()).is_pass());
    }

    #[test]
    fn configuration_passes_for_created_brief() {
        assert!(PhaseGate::check_configuration(&sample_brief()).is_pass());
    }

    #[test]
    fn configuration_rejects_blank_fields() {
        let mut brief = sample_brief();
        brief.content.main_message.clear();
        let result = PhaseGate::check_configuration(&brief);
        assert!(result.reasons()[0].contains("content.main_message"));
    }

    #[test]
    fn structure_checks_count_numbering_and_subtypes() {
        let config = GateConfig::default();
        assert!(PhaseGate::check_structure(&carousel(5), PostFormat::Carousel, &config).is_pass());

        let short = carousel(3);
        let result = PhaseGate::check_structure(&short, PostFormat::Carousel, &config);
        assert_eq!(result.rejections()[0].check, GateCheck::SlideCount);

        let mut bad = carousel(5);
        bad.slides[1].value_subtype = None;
        bad.slides[0].value_subtype = Some(ValueSubtype::Data);
        bad.slides[4].slide_number = 7;
        let result = PhaseGate::check_structure(&bad, PostFormat::Carousel, &config);
        let checks: Vec<GateCheck> = result.rejections().iter().map(|r| r.check).collect();
        assert!(checks.contains(&GateCheck::SlideNumbering));
        assert_eq!(checks.iter().filter(|c| **c == GateCheck::SlideSubtype).count(), 2);
        assert_eq!(result.slides(), vec![1, 2, 7]);
    }

    #[test]
    fn single_image_needs_exactly_one_slide() {
        let config = GateConfig::default();
        let mut one = carousel(1);
        one.slides[0].template_type = TemplateType::Hook;
        assert!(PhaseGate::check_structure(&one, PostFormat::SingleImage, &config).is_pass());
        assert!(!PhaseGate::check_structure(&carousel(5), PostFormat::SingleImage, &config).is_pass());
    }

    #[test]
    fn selection_flags_low_confidence_at_threshold() {
        let mut structure = carousel(2);
        structure.slides[0].template_id = Some("H01".into());
        structure.slides[0].confidence = Some(0.5);
        let result = PhaseGate::check_selection(&structure, &GateConfig::default());
        let checks: Vec<GateCheck> = result.rejections().iter().map(|r| r.check).collect();
        assert_eq!(checks, vec![GateCheck::LowConfidence, GateCheck::TemplateMissing]);
        assert!(result.feedback().contains("more specific"));
    }

    #[test]
    fn slides_gate_checks_slots_and_visual_text() {
        let structure = carousel(1);
        let mut content = SlideContent { slide_number: 1, ..Default::default() };
        content.slots.insert("headline".into(), "x".repeat(41));
        let mut visual = VisualSpec { slide_number: 1, description: "a desk".into(), ..Default::default() };
        visual.extra.insert("Headline".into(), serde_json::json!("Read me"));

        let result = PhaseGate::check_slides(&structure, &[content], &[visual], &GateConfig::default());
        let checks: Vec<GateCheck> = result.rejections().iter().map(|r| r.check).collect();
        assert_eq!(checks, vec![GateCheck::SlotLength, GateCheck::VisualText]);
    }

    #[test]
    fn slides_gate_reports_missing_outputs() {
        let result = PhaseGate::check_slides(&carousel(2), &[], &[], &GateConfig::default());
        assert_eq!(result.rejections().len(), 4);
        assert!(result.rejections().iter().all(|r| r.check == GateCheck::MissingContent));
    }

    #[test]
    fn slides_gate_rejects_declared_slot_left_empty() {
        let structure = carousel(1);
        let visual = VisualSpec { slide_number: 1, description: "a desk".into(), ..Default::default() };
        let empty: SlideContent = serde_json::from_value(serde_json::json!({"slide_number": 1, "slots": {}})).unwrap();

        let result = PhaseGate::check_slides(&structure, &[empty], &[visual.clone()], &GateConfig::default());
        assert!(!result.is_pass());
        let rejection = &result.rejections()[0];
        assert_eq!(rejection.check, GateCheck::MissingContent);
        assert!(rejection.reason.contains("'headline'"));

        let mut blank = SlideContent { slide_number: 1, ..Default::default() };
        blank.slots.insert("headline".into(), "  ".into());
        assert!(!PhaseGate::check_slides(&structure, &[blank], &[visual], &GateConfig::default()).is_pass());
    }

    #[test]
    fn caption_gate_uses_platform_limit() {
        let constraints = PlatformConstraints::for_platform(Platform::Twitter);
        let ok = Caption { text: "short".into(), hashtags: vec!["a".into()] };
        assert!(PhaseGate::check_caption(&ok, &constraints).is_pass());
        let long = Caption { text: "x".repeat(300), hashtags: vec!["a".into(), "b".into(), "c".into()] };
        let checks: Vec<GateCheck> = PhaseGate::check_caption(&long, &constraints)
            .rejections()
            .iter()
            .map(|r| r.check)
            .collect();
        assert_eq!(checks, vec![GateCheck::CaptionLength, GateCheck::HashtagLimit]);
    }

    #[test]
    fn quality_score_full_post_passes() {
        let mut brief = sample_brief();
        let mut structure = carousel(5);
        for s in &mut structure.slides {
            s.template_id = Some("X".into());
            s.confidence = Some(0.9);
        }
        brief.enrich_narrative(structure).unwrap();
        brief.enrich_copy(CopyGuidelines::default(), CtaGuidelines::default()).unwrap();

        let contents: Vec<SlideContent> = (1..=5)
            .map(|i| {
                let mut c = SlideContent { slide_number: i, ..Default::default() };
                c.slots.insert("headline".into(), "Focus on startup growth".into());
                c
            })
            .collect();
        let visuals: Vec<VisualSpec> = (1..=5)
            .map(|i| VisualSpec { slide_number: i, description: "clean desk".into(), ..Default::default() })
            .collect();
        let caption = Caption { text: "Focus wins.".into(), hashtags: vec![] };

        let score = PhaseGate::quality_score(&brief, &contents, &visuals, &caption, &GateConfig::default());
        // keywords all present, confidence 0.9 -> coherence 0.95
        assert!((score.coherence - 0.95).abs() < 1e-5);
        assert_eq!(score.textual, 1.0);
        assert_eq!(score.visual, 1.0);
        assert_eq!(score.completeness, 1.0);
        assert!(score.passed);
    }

    #[test]
    fn quality_score_empty_post_fails() {
        let brief = sample_brief();
        let score = PhaseGate::quality_score(&brief, &[], &[], &Caption::default(), &GateConfig::default());
        assert_eq!(score.completeness, 0.0);
        assert!(!score.passed);
        assert!((0.0..=1.0).contains(&score.overall));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(GateConfig::default().validate().is_empty());
        let config = GateConfig { min_slides: 0, ..Default::default() };
        assert_eq!(config.validate().len(), 1);
    }
}
