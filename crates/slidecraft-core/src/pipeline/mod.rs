//! Five-phase post pipeline: ideation, configuration, post creation, slide
//! generation and finalization, each behind a gate with bounded retries.

mod config;
pub mod defaults;
mod generator;
mod orchestrator;
pub mod prompts;
mod report;
mod retry;

pub use config::PipelineConfig;
pub use generator::{parse_reply, Prompt, Task, TextGenerator};
pub use orchestrator::{ArticleOutcome, IdeationOutput, Orchestrator, PostOutcome, SlideBatch};
pub use prompts::Feedback;
pub use report::{AttemptState, Phase, PhaseRecord, PostStatus, ValidationReport};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source article for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
}

impl Article {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Cooperative cancellation, checked between phases.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
