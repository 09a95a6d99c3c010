use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of generation request. Lets a provider route or a test script replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Ideas,
    Narrative,
    SlideCopy,
    SlideVisual,
    Caption,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Ideas => "ideas",
            Task::Narrative => "narrative",
            Task::SlideCopy => "slide_copy",
            Task::SlideVisual => "slide_visual",
            Task::Caption => "caption",
        }
    }
}

/// A rendered request to the language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub task: Task,
    /// Set for per-slide tasks.
    pub slide_number: Option<u32>,
    pub system: String,
    pub user: String,
}

/// Text-generation collaborator (the LLM invocation layer).
///
/// Implementations return the raw reply text. Rate limits, 5xx responses
/// and network failures map to `SlidecraftError::TransientProvider`.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Provider name (used in logs).
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt) -> Result<String>;
}

/// Parse a JSON reply, unwrapping a Markdown code fence if present.
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, String> {
    let body = unfence(raw);
    serde_json::from_str(body).map_err(|e| format!("reply is not valid JSON for this phase: {}", e))
}

fn unfence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // Skip the info string (e.g. `json`) up to the end of the line.
    let after = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => after,
    };
    match after.find("```") {
        Some(end) => after[..end].trim(),
        None => after.trim(),
    }
}
