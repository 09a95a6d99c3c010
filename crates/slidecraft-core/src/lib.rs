pub mod types;
pub mod error;
pub mod text;
pub mod brief;
pub mod templates;
pub mod vector;
pub mod selector;
pub mod gate;
pub mod storage;
pub mod pipeline;

pub use error::{SlidecraftError, Result};
pub use types::*;
pub use brief::{
    BrandProfile, BriefContext, CoherenceBrief, CopyGuidelines, CtaGuidelines, EnrichmentStage,
    PlatformConstraints, Role, VisualPreferences,
};
pub use templates::{ModuleType, TemplateLibrary, TextualTemplate};
pub use vector::{cosine_similarity, EmbeddingService, FastEmbedService, HashingEmbedder};
pub use selector::{
    candidate_pools, probe_scorer, ScoringMethod, SelectionProfile, SelectorConfig,
    TemplateScorer, TemplateSelection, TemplateSelector,
};
pub use gate::{GateCheck, GateConfig, GateRejection, GateResult, PhaseGate, QualityScore};
pub use storage::{artifact_key, DocumentStore, MemoryStore, RedbStore};
pub use pipeline::{
    Article, ArticleOutcome, AttemptState, CancellationToken, Orchestrator, Phase, PhaseRecord,
    PipelineConfig, PostOutcome, PostStatus, Prompt, Task, TextGenerator, ValidationReport,
};
