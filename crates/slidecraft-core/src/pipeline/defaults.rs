//! Deterministic phase defaults and guideline derivation.

use std::collections::BTreeMap;

use crate::brief::{CoherenceBrief, CopyGuidelines, CtaGuidelines, PlatformConstraints, VisualPreferences};
use crate::gate::{text_keys, GateConfig};
use crate::templates::TemplateLibrary;
use crate::types::{
    truncate_chars, Caption, NarrativeStructure, Pacing, Platform, PostFormat, SlideContent,
    SlideSpec, TemplateType, TransitionStyle, ValueSubtype, VisualSpec,
};

const DEFAULT_HEADLINE_CHARS: usize = 60;
const DEFAULT_BODY_CHARS: usize = 180;

/// Generic structure used when the narrative architect never produced a
/// usable one: hook, data, insight, solution, cta (or a lone hook).
pub fn default_structure(brief: &CoherenceBrief) -> NarrativeStructure {
    let plan: &[(TemplateType, Option<ValueSubtype>, &str, &str)] = match brief.format {
        PostFormat::SingleImage => &[(
            TemplateType::Hook,
            None,
            "Stop the scroll with the core message",
            "State the main message as a bold, specific claim",
        )],
        PostFormat::Carousel => &[
            (
                TemplateType::Hook,
                None,
                "Stop the scroll and open a curiosity gap",
                "Lead with a bold claim or question tied to the main message",
            ),
            (
                TemplateType::Value,
                Some(ValueSubtype::Data),
                "Prove the problem is real with a number",
                "Show a statistic with its source",
            ),
            (
                TemplateType::Value,
                Some(ValueSubtype::Insight),
                "Reframe the problem with a non-obvious insight",
                "Explain the underlying cause in one idea",
            ),
            (
                TemplateType::Value,
                Some(ValueSubtype::Solution),
                "Give the reader a concrete way forward",
                "List the steps or framework that solves it",
            ),
            (
                TemplateType::Cta,
                None,
                "Turn attention into a specific action",
                "Ask for one clear action",
            ),
        ],
    };

    let slides = plan
        .iter()
        .enumerate()
        .map(|(idx, (tt, vs, purpose, direction))| {
            let mut slide = SlideSpec::new(idx as u32 + 1, *tt, *vs);
            slide.purpose = purpose.to_string();
            slide.copy_direction = format!("{}. Main message: {}", direction, brief.content.main_message);
            slide.key_elements = brief.content.keywords.iter().take(2).cloned().collect();
            slide
                .content_slots
                .insert("headline".to_string(), DEFAULT_HEADLINE_CHARS);
            if *tt != TemplateType::Hook {
                slide.content_slots.insert("body".to_string(), DEFAULT_BODY_CHARS);
            }
            slide
        })
        .collect();

    NarrativeStructure {
        pacing: Pacing::Moderate,
        transition_style: TransitionStyle::Smooth,
        slides,
    }
}

/// Give every slide without declared slots a `body` slot sized by its template.
pub fn ensure_slots(structure: &mut NarrativeStructure, library: &TemplateLibrary) {
    for slide in &mut structure.slides {
        if !slide.content_slots.is_empty() {
            continue;
        }
        let max = slide
            .template_id
            .as_deref()
            .and_then(|id| library.get(id))
            .map(|t| t.length_range.1)
            .unwrap_or(DEFAULT_BODY_CHARS);
        slide.content_slots.insert("body".to_string(), max);
    }
}

/// Clear the selector's annotations.
pub fn strip_selection(structure: &NarrativeStructure) -> NarrativeStructure {
    let mut raw = structure.clone();
    for slide in &mut raw.slides {
        slide.template_id = None;
        slide.justification = None;
        slide.confidence = None;
    }
    raw
}

pub fn copy_guidelines(brief: &CoherenceBrief) -> CopyGuidelines {
    let formal = brief.voice.formality == "formal";
    let (headline_style, max_words) = match brief.platform {
        Platform::Linkedin => ("Declarative, specific, no clickbait", 40),
        Platform::Twitter => ("Punchy, one idea", 25),
        Platform::Instagram | Platform::Tiktok => ("Short, bold, curiosity-driven", 30),
    };
    let mut rules = vec![
        "One idea per slide".to_string(),
        "Headline first, supporting line second".to_string(),
    ];
    if !formal {
        rules.push("Contractions and second person are fine".to_string());
    }
    CopyGuidelines {
        headline_style: headline_style.to_string(),
        body_style: if formal {
            "Precise sentences backed by evidence".to_string()
        } else {
            "Conversational sentences in plain words".to_string()
        },
        max_words_per_slide: max_words,
        formatting_rules: rules,
        avoid_vocabulary: brief.emotions.avoid.clone(),
    }
}

pub fn cta_guidelines(brief: &CoherenceBrief, structure: &NarrativeStructure) -> CtaGuidelines {
    let placement = structure
        .slides
        .iter()
        .rev()
        .find(|s| s.template_type == TemplateType::Cta)
        .or_else(|| structure.slides.last())
        .map(|s| s.slide_number)
        .unwrap_or(1);
    let action = match brief.platform {
        Platform::Linkedin => "Share your take in the comments",
        Platform::Instagram => "Save this post for later",
        Platform::Tiktok => "Follow for part two",
        Platform::Twitter => "Repost if this helped",
    };
    let urgency = if brief.emotions.primary == "urgency" { "high" } else { "moderate" };
    CtaGuidelines {
        action: action.to_string(),
        urgency: urgency.to_string(),
        placement_slide: placement,
        fallback_text: format!("{}. {}", brief.content.main_message.trim_end_matches('.'), action),
    }
}

pub fn visual_preferences(brief: &CoherenceBrief) -> VisualPreferences {
    let layout_style = match brief.format {
        PostFormat::SingleImage => "single focal point",
        PostFormat::Carousel => "consistent grid across slides",
    };
    VisualPreferences {
        layout_style: layout_style.to_string(),
        color_emphasis: format!("{} accents", brief.visual.palette_id),
        image_style: brief.visual.style.clone(),
        composition_notes: vec![
            format!("Mood: {}", brief.visual.mood),
            "Leave clear space for text overlays".to_string(),
        ],
    }
}

/// Bring slide copy within limits; fill slides that never got copy.
pub fn repair_contents(
    structure: &NarrativeStructure,
    contents: &[SlideContent],
    library: &TemplateLibrary,
) -> (Vec<SlideContent>, Vec<String>) {
    let mut warnings = Vec::new();
    let by_slide: BTreeMap<u32, &SlideContent> = contents.iter().map(|c| (c.slide_number, c)).collect();

    let repaired = structure
        .slides
        .iter()
        .map(|slide| {
            let n = slide.slide_number;
            let template = slide.template_id.as_deref().and_then(|id| library.get(id));
            let seed = template.map(|t| t.example.as_str()).unwrap_or(slide.purpose.as_str());
            match by_slide.get(&n) {
                Some(content) => {
                    let mut content = (*content).clone();
                    for (slot, max) in &slide.content_slots {
                        let blank = content.slots.get(slot).map_or(true, |t| t.trim().is_empty());
                        if blank {
                            content.slots.insert(slot.clone(), truncate_chars(seed, *max));
                            warnings.push(format!("slide {} slot '{}' filled from template example", n, slot));
                        } else if let Some(text) = content.slots.get_mut(slot) {
                            if text.chars().count() > *max {
                                *text = truncate_chars(text, *max);
                                warnings.push(format!("slide {} slot '{}' truncated to {} chars", n, slot, max));
                            }
                        }
                    }
                    content
                }
                None => {
                    let slots = slide
                        .content_slots
                        .iter()
                        .map(|(slot, max)| (slot.clone(), truncate_chars(seed, *max)))
                        .collect();
                    warnings.push(format!("slide {} copy filled from template example", n));
                    SlideContent {
                        slide_number: n,
                        template_id: slide.template_id.clone(),
                        slots,
                    }
                }
            }
        })
        .collect();
    (repaired, warnings)
}

/// Strip copy from visual specs; add a placeholder where none exists.
pub fn repair_visuals(
    structure: &NarrativeStructure,
    visuals: &[VisualSpec],
    brief: &CoherenceBrief,
    gate: &GateConfig,
) -> (Vec<VisualSpec>, Vec<String>) {
    let mut warnings = Vec::new();
    let repaired = structure
        .slides
        .iter()
        .map(|slide| {
            let n = slide.slide_number;
            match visuals.iter().find(|v| v.slide_number == n) {
                Some(visual) => {
                    let mut visual = visual.clone();
                    let leaked = text_keys(&visual, gate);
                    if !leaked.is_empty() {
                        for key in &leaked {
                            visual.extra.remove(key);
                        }
                        warnings.push(format!("slide {} visual text fields removed: {}", n, leaked.join(", ")));
                    }
                    if visual.description.trim().is_empty() {
                        visual.description = placeholder_description(slide, brief);
                    }
                    visual
                }
                None => {
                    warnings.push(format!("slide {} visual spec is a placeholder", n));
                    VisualSpec {
                        slide_number: n,
                        description: placeholder_description(slide, brief),
                        layout: brief.visual.style.clone(),
                        palette: vec![brief.visual.palette_id.clone()],
                        mood: brief.visual.mood.clone(),
                        elements: Vec::new(),
                        extra: BTreeMap::new(),
                    }
                }
            }
        })
        .collect();
    (repaired, warnings)
}

fn placeholder_description(slide: &SlideSpec, brief: &CoherenceBrief) -> String {
    format!(
        "{} background in {} style conveying {}",
        brief.visual.mood, brief.visual.style, slide.purpose.to_lowercase()
    )
}

/// Fit a caption to the platform, or build one from the CTA guidelines.
pub fn repair_caption(
    caption: Option<&Caption>,
    constraints: &PlatformConstraints,
    cta: Option<&CtaGuidelines>,
    brief: &CoherenceBrief,
) -> (Caption, String) {
    match caption {
        Some(caption) if !caption.text.trim().is_empty() => {
            let mut fitted = caption.clone();
            fitted.hashtags.truncate(constraints.hashtag_limit);
            let tag_chars = fitted.char_count() - fitted.text.chars().count();
            let budget = constraints.caption_max_chars.saturating_sub(tag_chars);
            fitted.text = truncate_chars(&fitted.text, budget);
            if fitted.char_count() > constraints.caption_max_chars {
                fitted.hashtags.clear();
                fitted.text = truncate_chars(&caption.text, constraints.caption_max_chars);
            }
            (fitted, "caption truncated to the platform limit".to_string())
        }
        _ => {
            let text = match cta {
                Some(cta) if !cta.fallback_text.trim().is_empty() => cta.fallback_text.clone(),
                _ => brief.content.main_message.clone(),
            };
            let mut caption = Caption {
                text: String::new(),
                hashtags: keyword_hashtags(&brief.content.keywords, constraints.hashtag_limit),
            };
            let tag_chars = caption.char_count();
            caption.text = truncate_chars(&text, constraints.caption_max_chars.saturating_sub(tag_chars));
            if caption.text.is_empty() || caption.char_count() > constraints.caption_max_chars {
                caption.hashtags.clear();
                caption.text = truncate_chars(&text, constraints.caption_max_chars);
            }
            (caption, "generic caption built from the CTA guidelines".to_string())
        }
    }
}

/// Brief keywords as hashtags: no spaces or leading `#`, deduplicated, capped at `limit`.
fn keyword_hashtags(keywords: &[String], limit: usize) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for keyword in keywords {
        if tags.len() >= limit {
            break;
        }
        let tag = keyword
            .trim()
            .trim_start_matches('#')
            .split_whitespace()
            .collect::<String>()
            .to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::tests::sample_brief;
    use crate::gate::PhaseGate;
    use serde_json::json;

    #[test]
    fn default_structure_passes_structure_gate() {
        let brief = sample_brief();
        let structure = default_structure(&brief);
        assert_eq!(structure.slides.len(), 5);
        assert!(PhaseGate::check_structure(&structure, PostFormat::Carousel, &GateConfig::default()).is_pass());
    }

    #[test]
    fn ensure_slots_uses_template_length() {
        let library = TemplateLibrary::builtin();
        let mut structure = default_structure(&sample_brief());
        structure.slides[0].content_slots.clear();
        structure.slides[0].template_id = Some("H01".into());
        ensure_slots(&mut structure, &library);
        let expected = library.get("H01").unwrap().length_range.1;
        assert_eq!(structure.slides[0].content_slots.get("body"), Some(&expected));
    }

    #[test]
    fn repaired_contents_fit_their_slots() {
        let brief = sample_brief();
        let library = TemplateLibrary::builtin();
        let structure = default_structure(&brief);
        let mut long = SlideContent { slide_number: 1, ..Default::default() };
        long.slots.insert("headline".into(), "word ".repeat(40));

        let (contents, warnings) = repair_contents(&structure, &[long], &library);
        assert_eq!(contents.len(), 5);
        assert!(contents[0].slots["headline"].chars().count() <= DEFAULT_HEADLINE_CHARS);
        assert_eq!(warnings.len(), 5);
        let visuals: Vec<VisualSpec> = (1..=5)
            .map(|n| VisualSpec { slide_number: n, description: "x".into(), ..Default::default() })
            .collect();
        assert!(PhaseGate::check_slides(&structure, &contents, &visuals, &GateConfig::default()).is_pass());
    }

    #[test]
    fn repaired_visuals_carry_no_text() {
        let brief = sample_brief();
        let structure = default_structure(&brief);
        let mut leaky = VisualSpec { slide_number: 2, description: "chart".into(), ..Default::default() };
        leaky.extra.insert("title".into(), json!("73%"));
        leaky.extra.insert("lighting".into(), json!("soft"));

        let gate = GateConfig::default();
        let (visuals, warnings) = repair_visuals(&structure, &[leaky], &brief, &gate);
        assert_eq!(visuals.len(), 5);
        assert!(visuals.iter().all(|v| text_keys(v, &gate).is_empty()));
        assert!(visuals[1].extra.contains_key("lighting"));
        assert_eq!(warnings.len(), 5);
    }

    #[test]
    fn caption_is_cut_to_limit_or_generated() {
        let brief = sample_brief();
        let constraints = PlatformConstraints::for_platform(Platform::Twitter);
        let long = Caption {
            text: "a".repeat(400),
            hashtags: vec!["one".into(), "two".into(), "three".into()],
        };
        let (fitted, _) = repair_caption(Some(&long), &constraints, None, &brief);
        assert!(fitted.char_count() <= 280);
        assert_eq!(fitted.hashtags.len(), 2);
        assert!(PhaseGate::check_caption(&fitted, &constraints).is_pass());

        let cta = cta_guidelines(&brief, &default_structure(&brief));
        let (generic, note) = repair_caption(None, &constraints, Some(&cta), &brief);
        assert_eq!(generic.text, cta.fallback_text);
        assert_eq!(generic.hashtags, vec!["focus", "startup"]);
        assert!(note.contains("generic"));
        assert!(PhaseGate::check_caption(&generic, &constraints).is_pass());
    }

    #[test]
    fn generic_caption_hashtags_follow_brief_keywords_within_limit() {
        let mut brief = sample_brief();
        brief.content.keywords = vec!["#Focus".into(), "early stage".into(), "focus".into(), " ".into()];
        let linkedin = PlatformConstraints::for_platform(Platform::Linkedin);
        let (caption, _) = repair_caption(None, &linkedin, None, &brief);
        assert_eq!(caption.hashtags, vec!["focus", "earlystage"]);
        assert_eq!(caption.text, brief.content.main_message);

        let mut tight = PlatformConstraints::for_platform(Platform::Twitter);
        tight.hashtag_limit = 0;
        let (caption, _) = repair_caption(None, &tight, None, &brief);
        assert!(caption.hashtags.is_empty());

        tight.hashtag_limit = 2;
        tight.caption_max_chars = 10;
        let (caption, _) = repair_caption(None, &tight, None, &brief);
        assert!(caption.char_count() <= 10);
        assert!(!caption.text.is_empty());
    }

    #[test]
    fn cta_lands_on_last_cta_slide() {
        let brief = sample_brief();
        let cta = cta_guidelines(&brief, &default_structure(&brief));
        assert_eq!(cta.placement_slide, 5);
        assert_eq!(cta.action, "Save this post for later");
    }
}
