use serde::{Deserialize, Serialize};

use crate::types::{Insight, Platform};

/// How the post speaks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VoiceSection {
    pub tone: String,
    pub personality_traits: Vec<String>,
    pub vocabulary_level: String,
    pub formality: String,
}

/// Visual identity handles. The compositor resolves the ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VisualSection {
    pub palette_id: String,
    pub typography_id: String,
    pub style: String,
    pub mood: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EmotionSection {
    pub primary: String,
    pub secondary: Vec<String>,
    pub avoid: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentSection {
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    pub main_message: String,
    pub angle: String,
    pub hook: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AudienceSection {
    pub persona: String,
    pub pain_points: Vec<String>,
    pub desires: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContextSection {
    pub article_excerpt: String,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BrandSection {
    pub values: Vec<String>,
    pub assets: Vec<String>,
}

/// Audience and brand data owned by the profile repository.
///
/// Optional at creation time. Empty fields fall back to values derived from
/// the idea's tone and platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BrandProfile {
    pub values: Vec<String>,
    pub assets: Vec<String>,
    pub palette_id: Option<String>,
    pub typography_id: Option<String>,
    pub pain_points: Vec<String>,
    pub desires: Vec<String>,
    pub avoid_emotions: Vec<String>,
}

// ── Evolutionary records ──────────────────────────────────────────────────────

/// Written by slide generation before copy is produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CopyGuidelines {
    pub headline_style: String,
    pub body_style: String,
    pub max_words_per_slide: u32,
    pub formatting_rules: Vec<String>,
    pub avoid_vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CtaGuidelines {
    pub action: String,
    pub urgency: String,
    pub placement_slide: u32,
    /// Wording used when caption generation has to fall back.
    pub fallback_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VisualPreferences {
    pub layout_style: String,
    pub color_emphasis: String,
    pub image_style: String,
    pub composition_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformConstraints {
    pub platform: Platform,
    pub caption_max_chars: usize,
    pub hashtag_limit: usize,
    pub hashtag_strategy: String,
    pub emoji_policy: String,
}

impl PlatformConstraints {
    pub fn for_platform(platform: Platform) -> Self {
        let (hashtag_strategy, emoji_policy) = match platform {
            Platform::Instagram => ("mix broad and niche tags at the end", "sparing, to mark structure"),
            Platform::Linkedin => ("three to five professional tags", "avoid"),
            Platform::Tiktok => ("trend tags first, then niche", "welcome"),
            Platform::Twitter => ("at most two inline tags", "at most one"),
        };
        Self {
            platform,
            caption_max_chars: platform.caption_limit(),
            hashtag_limit: platform.hashtag_limit(),
            hashtag_strategy: hashtag_strategy.to_string(),
            emoji_policy: emoji_policy.to_string(),
        }
    }
}
