use serde::{Deserialize, Serialize};

use crate::gate::QualityScore;

/// The five ordered phases of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ideation,
    Configuration,
    PostCreation,
    SlideGeneration,
    Finalization,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Ideation,
        Phase::Configuration,
        Phase::PostCreation,
        Phase::SlideGeneration,
        Phase::Finalization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ideation => "ideation",
            Phase::Configuration => "configuration",
            Phase::PostCreation => "post_creation",
            Phase::SlideGeneration => "slide_generation",
            Phase::Finalization => "finalization",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded-retry state of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "retry")]
pub enum AttemptState {
    Attempting,
    Retrying(u32),
    Defaulted,
    Passed,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Defaulted | AttemptState::Passed)
    }
}

/// What happened in one phase of one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub state: AttemptState,
    pub attempts: u32,
    /// Gate reasons of every failed attempt, in order.
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl PhaseRecord {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: AttemptState::Attempting,
            attempts: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.attempts += 1;
        if self.attempts > 1 {
            self.state = AttemptState::Retrying(self.attempts - 1);
        }
    }

    pub(crate) fn fail(&mut self, reasons: impl IntoIterator<Item = String>) {
        self.failures.extend(reasons);
    }

    pub(crate) fn pass(&mut self) {
        self.state = AttemptState::Passed;
    }

    pub(crate) fn default_applied(&mut self, warning: impl Into<String>) {
        self.state = AttemptState::Defaulted;
        self.warn(warning);
    }

    pub(crate) fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        log::warn!("[{}] {}", self.phase, warning);
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Completed,
    Failed,
}

/// Per-post audit of phase outcomes and the final quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub post_id: Option<String>,
    pub idea_id: String,
    pub status: PostStatus,
    pub phases: Vec<PhaseRecord>,
    pub quality: Option<QualityScore>,
    /// Quality score above threshold.
    pub passed: bool,
    /// At least one phase fell back to its default.
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    pub(crate) fn new(idea_id: &str) -> Self {
        Self {
            post_id: None,
            idea_id: idea_id.to_string(),
            status: PostStatus::Failed,
            phases: Vec::new(),
            quality: None,
            passed: false,
            degraded: false,
            error: None,
        }
    }

    pub(crate) fn push(&mut self, record: PhaseRecord) {
        if record.state == AttemptState::Defaulted {
            self.degraded = true;
        }
        self.phases.push(record);
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|r| r.phase == phase)
    }

    /// Warnings from every phase, prefixed with the phase name.
    pub fn warnings(&self) -> Vec<String> {
        self.phases
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| format!("{}: {}", r.phase, w)))
            .collect()
    }
}
