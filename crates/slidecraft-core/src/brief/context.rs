use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::CoherenceBrief;

/// Downstream consumers of the brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    NarrativeArchitect,
    Copywriter,
    VisualComposer,
    CaptionWriter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::NarrativeArchitect => "narrative_architect",
            Role::Copywriter => "copywriter",
            Role::VisualComposer => "visual_composer",
            Role::CaptionWriter => "caption_writer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of a brief for one role.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BriefContext {
    pub role: Role,
    pub post_id: String,
    pub fields: Map<String, Value>,
}

impl BriefContext {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Pretty JSON for embedding in a prompt.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_default()
    }
}

impl CoherenceBrief {
    /// Project the fields `role` is allowed to see.
    ///
    /// Evolutionary fields appear only once populated, and only when they
    /// belong to a phase at or before the role's own.
    pub fn context_for(&self, role: Role) -> BriefContext {
        let mut fields = Map::new();
        fields.insert("platform".into(), json!(self.platform));
        fields.insert("format".into(), json!(self.format));

        match role {
            Role::NarrativeArchitect => {
                fields.insert("voice".into(), json!(self.voice));
                fields.insert("emotions".into(), json!(self.emotions));
                fields.insert("content".into(), json!(self.content));
                fields.insert("audience".into(), json!(self.audience));
                fields.insert("context".into(), json!(self.context));
            }
            Role::Copywriter => {
                fields.insert("voice".into(), json!(self.voice));
                fields.insert("emotions".into(), json!(self.emotions));
                fields.insert("content".into(), json!(self.content));
                fields.insert("audience".into(), json!(self.audience));
                fields.insert("brand_values".into(), json!(self.brand.values));
                fields.insert("insights".into(), json!(self.context.insights));
                self.insert_narrative(&mut fields);
                if let Some(copy) = self.copy_guidelines() {
                    fields.insert("copy_guidelines".into(), json!(copy));
                }
                if let Some(cta) = self.cta_guidelines() {
                    fields.insert("cta_guidelines".into(), json!(cta));
                }
            }
            Role::VisualComposer => {
                fields.insert("visual".into(), json!(self.visual));
                fields.insert("emotions".into(), json!(self.emotions));
                fields.insert("brand_assets".into(), json!(self.brand.assets));
                self.insert_narrative(&mut fields);
                if let Some(prefs) = self.visual_preferences() {
                    fields.insert("visual_preferences".into(), json!(prefs));
                }
            }
            Role::CaptionWriter => {
                fields.insert("voice".into(), json!(self.voice));
                fields.insert("content".into(), json!(self.content));
                fields.insert("audience".into(), json!(self.audience));
                if let Some(structure) = self.narrative_structure() {
                    let purposes: Vec<&str> =
                        structure.slides.iter().map(|s| s.purpose.as_str()).collect();
                    fields.insert("slide_purposes".into(), json!(purposes));
                }
                if let Some(cta) = self.cta_guidelines() {
                    fields.insert("cta_guidelines".into(), json!(cta));
                }
                if let Some(constraints) = self.platform_constraints() {
                    fields.insert("platform_constraints".into(), json!(constraints));
                }
            }
        }

        BriefContext {
            role,
            post_id: self.post_id.clone(),
            fields,
        }
    }

    fn insert_narrative(&self, fields: &mut Map<String, Value>) {
        if let Some(pacing) = self.narrative_pacing() {
            fields.insert("narrative_pacing".into(), json!(pacing));
        }
        if let Some(style) = self.transition_style() {
            fields.insert("transition_style".into(), json!(style));
        }
        if let Some(structure) = self.narrative_structure() {
            fields.insert("narrative_structure".into(), json!(structure));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::tests::{sample_brief, sample_structure};
    use crate::brief::{CopyGuidelines, CtaGuidelines};

    #[test]
    fn architect_sees_no_evolutionary_fields() {
        let mut brief = sample_brief();
        brief.enrich_narrative(sample_structure()).unwrap();
        let ctx = brief.context_for(Role::NarrativeArchitect);
        assert!(ctx.has("voice"));
        assert!(ctx.has("context"));
        assert!(!ctx.has("narrative_structure"));
        assert!(!ctx.has("copy_guidelines"));
    }

    #[test]
    fn copywriter_only_sees_populated_fields() {
        let mut brief = sample_brief();
        let ctx = brief.context_for(Role::Copywriter);
        assert!(!ctx.has("narrative_structure"));
        assert!(!ctx.has("copy_guidelines"));

        brief.enrich_narrative(sample_structure()).unwrap();
        brief
            .enrich_copy(CopyGuidelines::default(), CtaGuidelines::default())
            .unwrap();
        let ctx = brief.context_for(Role::Copywriter);
        assert!(ctx.has("narrative_structure"));
        assert!(ctx.has("copy_guidelines"));
        assert!(ctx.has("cta_guidelines"));
        assert!(!ctx.has("visual"));
    }

    #[test]
    fn visual_composer_never_sees_copy() {
        let mut brief = sample_brief();
        brief.enrich_narrative(sample_structure()).unwrap();
        brief
            .enrich_copy(CopyGuidelines::default(), CtaGuidelines::default())
            .unwrap();
        let ctx = brief.context_for(Role::VisualComposer);
        assert!(ctx.has("visual"));
        assert!(!ctx.has("copy_guidelines"));
        assert!(!ctx.has("voice"));
    }

    #[test]
    fn projection_does_not_mutate() {
        let brief = sample_brief();
        let before = brief.clone();
        let _ = brief.context_for(Role::CaptionWriter);
        assert_eq!(brief, before);
        assert!(brief.context_for(Role::CaptionWriter).to_prompt_json().contains("persona"));
    }
}
