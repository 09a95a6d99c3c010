use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type alias for embedding vectors
pub type Embedding = Vec<f32>;

/// Target social platform for a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    #[serde(alias = "linked_in")]
    Linkedin,
    Tiktok,
    #[serde(alias = "x")]
    Twitter,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
            Platform::Twitter => "twitter",
        }
    }

    /// Hard caption limit in characters.
    pub fn caption_limit(&self) -> usize {
        match self {
            Platform::Instagram => 2200,
            Platform::Linkedin => 3000,
            Platform::Tiktok => 2200,
            Platform::Twitter => 280,
        }
    }

    pub fn hashtag_limit(&self) -> usize {
        match self {
            Platform::Instagram => 30,
            Platform::Linkedin => 5,
            Platform::Tiktok => 10,
            Platform::Twitter => 2,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Carousel posts have several slides, single-image posts exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostFormat {
    #[default]
    Carousel,
    SingleImage,
}

/// A referenced insight from the source article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Insight {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Distilled view of the source article, produced alongside the ideas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ArticleSummary {
    pub title: String,
    pub key_points: Vec<String>,
    pub insights: Vec<Insight>,
    pub main_themes: Vec<String>,
    pub keywords: Vec<String>,
}

impl ArticleSummary {
    /// A short excerpt built from the title and the first key points.
    pub fn excerpt(&self, max_points: usize) -> String {
        let mut parts = vec![self.title.clone()];
        parts.extend(self.key_points.iter().take(max_points).cloned());
        parts.retain(|p| !p.trim().is_empty());
        parts.join(". ")
    }
}

/// One post idea as returned by ideation.
///
/// Required fields are optional here so that an LLM reply missing them still
/// parses and the gap can be reported by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Idea {
    pub id: String,
    pub platform: Option<Platform>,
    pub format: Option<PostFormat>,
    pub tone: Option<String>,
    pub persona: Option<String>,
    pub angle: String,
    pub hook: Option<String>,
    pub narrative_arc: String,
    pub insight_ids: Vec<String>,
    pub estimated_slides: Option<u32>,
    pub confidence: f32,
}

impl Idea {
    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<String> {
        let blank = |v: &Option<String>| v.as_deref().map(str::trim).map_or(true, str::is_empty);
        let mut missing = Vec::new();
        if self.platform.is_none() {
            missing.push("platform".to_string());
        }
        if blank(&self.tone) {
            missing.push("tone".to_string());
        }
        if blank(&self.persona) {
            missing.push("persona".to_string());
        }
        if blank(&self.hook) {
            missing.push("hook".to_string());
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn post_format(&self) -> PostFormat {
        match (self.format, self.estimated_slides) {
            (Some(format), _) => format,
            (None, Some(1)) => PostFormat::SingleImage,
            _ => PostFormat::Carousel,
        }
    }
}

/// Narrative role of a slide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Hook,
    Value,
    Cta,
    Transition,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Hook => "hook",
            TemplateType::Value => "value",
            TemplateType::Cta => "cta",
            TemplateType::Transition => "transition",
        }
    }
}

/// Refinement of a `value` slide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ValueSubtype {
    Data,
    Insight,
    Solution,
    Example,
}

impl ValueSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSubtype::Data => "data",
            ValueSubtype::Insight => "insight",
            ValueSubtype::Solution => "solution",
            ValueSubtype::Example => "example",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    Fast,
    #[default]
    Moderate,
    Deliberate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    Abrupt,
    #[default]
    Smooth,
    Dramatic,
}

/// Plan for a single slide. Template fields are filled by the selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideSpec {
    pub slide_number: u32,
    pub template_type: TemplateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_subtype: Option<ValueSubtype>,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub copy_direction: String,
    #[serde(default)]
    pub key_elements: Vec<String>,
    /// Slot name → maximum characters.
    #[serde(default)]
    pub content_slots: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl SlideSpec {
    pub fn new(slide_number: u32, template_type: TemplateType, value_subtype: Option<ValueSubtype>) -> Self {
        Self {
            slide_number,
            template_type,
            value_subtype,
            purpose: String::new(),
            copy_direction: String::new(),
            key_elements: Vec::new(),
            content_slots: BTreeMap::new(),
            template_id: None,
            justification: None,
            confidence: None,
        }
    }

    /// Concatenation of purpose, copy direction and key elements, in that order.
    pub fn description(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.key_elements.len());
        parts.push(self.purpose.trim());
        parts.push(self.copy_direction.trim());
        parts.extend(self.key_elements.iter().map(|k| k.trim()));
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    pub fn is_selected(&self) -> bool {
        self.template_id.is_some() && self.confidence.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeStructure {
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub transition_style: TransitionStyle,
    pub slides: Vec<SlideSpec>,
}

/// Generated copy for one slide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SlideContent {
    pub slide_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Slot name → generated text.
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
}

/// Image-side description of one slide. Carries no copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VisualSpec {
    pub slide_number: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub elements: Vec<String>,
    /// Any other keys the generator produced. Kept so the gate can inspect them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Caption {
    pub text: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl Caption {
    /// Caption as it is published: body, blank line, hashtags.
    pub fn full_text(&self) -> String {
        if self.hashtags.is_empty() {
            return self.text.clone();
        }
        let tags: Vec<String> = self
            .hashtags
            .iter()
            .map(|t| format!("#{}", t.trim_start_matches('#')))
            .collect();
        format!("{}\n\n{}", self.text, tags.join(" "))
    }

    pub fn char_count(&self) -> usize {
        self.full_text().chars().count()
    }
}

/// Truncate to at most `max_chars` characters without splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_reports_blank_and_absent() {
        let idea = Idea {
            id: "i1".into(),
            platform: Some(Platform::Instagram),
            tone: Some("  ".into()),
            persona: None,
            hook: Some("Stop scrolling".into()),
            ..Default::default()
        };
        assert_eq!(idea.missing_fields(), vec!["tone", "persona"]);
        assert!(!idea.is_complete());
    }

    #[test]
    fn post_format_follows_slide_estimate() {
        let mut idea = Idea { estimated_slides: Some(1), ..Default::default() };
        assert_eq!(idea.post_format(), PostFormat::SingleImage);
        idea.estimated_slides = Some(7);
        assert_eq!(idea.post_format(), PostFormat::Carousel);
        idea.format = Some(PostFormat::SingleImage);
        assert_eq!(idea.post_format(), PostFormat::SingleImage);
    }

    #[test]
    fn slide_description_order() {
        let mut slide = SlideSpec::new(2, TemplateType::Value, Some(ValueSubtype::Data));
        slide.purpose = "Prove it".into();
        slide.copy_direction = "Show the number".into();
        slide.key_elements = vec!["73%".into(), "source".into()];
        assert_eq!(slide.description(), "Prove it Show the number 73% source");
    }

    #[test]
    fn slide_spec_parses_without_selection_fields() {
        let json = r#"{"slide_number":1,"template_type":"hook","purpose":"grab attention"}"#;
        let slide: SlideSpec = serde_json::from_str(json).unwrap();
        assert_eq!(slide.template_type, TemplateType::Hook);
        assert!(slide.value_subtype.is_none());
        assert!(!slide.is_selected());
    }

    #[test]
    fn visual_spec_keeps_unknown_keys() {
        let json = r#"{"slide_number":3,"description":"desk at dawn","headline":"Wake up"}"#;
        let spec: VisualSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.extra.get("headline"), Some(&Value::String("Wake up".into())));
    }

    #[test]
    fn caption_full_text_normalises_hashtags() {
        let caption = Caption {
            text: "Read this".into(),
            hashtags: vec!["#growth".into(), "marketing".into()],
        };
        assert_eq!(caption.full_text(), "Read this\n\n#growth #marketing");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ação rápida", 4), "ação");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn platform_aliases() {
        let p: Platform = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(p, Platform::Twitter);
        assert_eq!(Platform::Twitter.caption_limit(), 280);
    }
}
