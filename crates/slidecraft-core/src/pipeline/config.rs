use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SlidecraftError};
use crate::gate::GateConfig;

/// Configuration for the phase orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Retries after the first attempt before a phase default is applied.
    /// Default: 2
    pub max_retries: u32,

    /// Upper bound for a single phase call.
    /// Default: 60
    pub phase_timeout_secs: u64,

    /// Base delay for exponential backoff on provider errors.
    /// Default: 500
    pub backoff_base_ms: u64,

    /// Ideas turned into posts per article.
    /// Default: 1
    pub posts_per_article: usize,

    pub gate: GateConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            phase_timeout_secs: 60,
            backoff_base_ms: 500,
            posts_per_article: 1,
            gate: GateConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.min(10);
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_ms = base.as_millis() as u64;
        self
    }

    pub fn with_posts_per_article(mut self, posts: usize) -> Self {
        self.posts_per_article = posts.max(1);
        self
    }

    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }

    /// Delay before retry `n` (0-based): `base * 2^n`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    pub fn validate(&self) -> Result<()> {
        if self.phase_timeout_secs == 0 {
            return Err(SlidecraftError::Validation(
                "phase_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.posts_per_article == 0 {
            return Err(SlidecraftError::Validation(
                "posts_per_article must be greater than 0".to_string(),
            ));
        }
        let gate_errors = self.gate.validate();
        if !gate_errors.is_empty() {
            return Err(SlidecraftError::Validation(gate_errors.join("; ")));
        }
        Ok(())
    }
}
