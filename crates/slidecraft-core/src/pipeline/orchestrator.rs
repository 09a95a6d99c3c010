use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::config::PipelineConfig;
use super::defaults;
use super::generator::{parse_reply, Prompt, TextGenerator};
use super::prompts;
use super::report::{Phase, PhaseRecord, PostStatus, ValidationReport};
use super::retry::{parse_failure, run_gated, Gated};
use super::{Article, CancellationToken};
use crate::brief::{BrandProfile, CoherenceBrief, PlatformConstraints, Role};
use crate::error::{Result, SlidecraftError};
use crate::gate::{PhaseGate, QualityScore};
use crate::selector::{SelectionProfile, TemplateSelector};
use crate::storage::{artifact_key, DocumentStore};
use crate::types::{ArticleSummary, Caption, Idea, NarrativeStructure, SlideContent, VisualSpec};

/// What ideation returns: the article summary plus candidate ideas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeationOutput {
    #[serde(alias = "summary")]
    pub article_summary: ArticleSummary,
    pub ideas: Vec<Idea>,
}

/// Copy and visuals for every slide of one post.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideBatch {
    pub contents: Vec<SlideContent>,
    pub visuals: Vec<VisualSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CopyReply {
    slots: BTreeMap<String, String>,
}

/// Terminal state and artifacts of one post.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub report: ValidationReport,
    pub brief: Option<CoherenceBrief>,
    pub slide_contents: Vec<SlideContent>,
    pub visual_specs: Vec<VisualSpec>,
    pub caption: Option<Caption>,
}

impl PostOutcome {
    fn new(idea: &Idea) -> Self {
        Self {
            report: ValidationReport::new(&idea.id),
            brief: None,
            slide_contents: Vec::new(),
            visual_specs: Vec::new(),
            caption: None,
        }
    }

    pub fn status(&self) -> PostStatus {
        self.report.status
    }

    pub fn post_id(&self) -> Option<&str> {
        self.report.post_id.as_deref()
    }
}

/// Result of running one article through the pipeline.
#[derive(Debug, Clone)]
pub struct ArticleOutcome {
    pub run_id: String,
    pub summary: ArticleSummary,
    pub ideas: Vec<Idea>,
    pub posts: Vec<PostOutcome>,
}

/// Drives posts through the five phases.
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    selector: TemplateSelector,
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
    profile: BrandProfile,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        selector: TemplateSelector,
        store: Arc<dyn DocumentStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            selector,
            store,
            config,
            profile: BrandProfile::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_profile(mut self, profile: BrandProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ideate once for the article, then run the top ideas as concurrent posts.
    ///
    /// Fails only when ideation yields no usable idea at all. Per-post
    /// failures are reported in each post's outcome.
    pub async fn run_article(&self, article: &Article) -> Result<ArticleOutcome> {
        let run_id = Uuid::now_v7().to_string();
        log::info!("Starting run {} for '{}'", run_id, article.title);

        self.check_cancelled(Phase::Ideation)?;
        let mut ideation_record = PhaseRecord::new(Phase::Ideation);
        let ideation = self.ideate(article, &mut ideation_record).await?;
        self.save(&run_id, "post_ideas", &ideation)?;

        let selected = rank_ideas(&ideation.ideas, self.config.posts_per_article);
        log::info!(
            "Run {}: {} ideas, building {} posts",
            run_id,
            ideation.ideas.len(),
            selected.len()
        );

        let posts = join_all(
            selected
                .iter()
                .map(|idea| self.run_post(article, idea, &ideation.article_summary, &ideation_record)),
        )
        .await;

        Ok(ArticleOutcome {
            run_id,
            summary: ideation.article_summary,
            ideas: ideation.ideas,
            posts,
        })
    }

    /// Phase 1. Keeps the last parsed ideas when the gate never passes.
    pub async fn ideate(&self, article: &Article, record: &mut PhaseRecord) -> Result<IdeationOutput> {
        let gate = &self.config.gate;
        let outcome = run_gated(Phase::Ideation, &self.config, record, |feedback| {
            let prompt = prompts::ideation(article, gate.min_ideas, feedback.as_ref());
            let generator = Arc::clone(&self.generator);
            async move {
                let raw = generator.generate(&prompt).await?;
                let output: IdeationOutput =
                    parse_reply(&raw).map_err(|reason| parse_failure(Phase::Ideation, reason))?;
                let verdict = PhaseGate::check_ideation(&output.ideas, gate);
                Ok((output, verdict))
            }
        })
        .await?;

        match outcome {
            Gated::Passed(output) => Ok(output),
            Gated::Exhausted(Some(output)) if !output.ideas.is_empty() => {
                record.default_applied(format!(
                    "proceeding with {} ideas, below the minimum of {}",
                    output.ideas.len(),
                    gate.min_ideas
                ));
                Ok(output)
            }
            Gated::Exhausted(_) => Err(SlidecraftError::ValidationGate {
                phase: Phase::Ideation.to_string(),
                reasons: record.failures.clone(),
            }),
        }
    }

    /// Phases 2 to 5 for one idea. Never fails; the outcome carries the status.
    pub async fn run_post(
        &self,
        article: &Article,
        idea: &Idea,
        summary: &ArticleSummary,
        ideation: &PhaseRecord,
    ) -> PostOutcome {
        let mut out = PostOutcome::new(idea);
        out.report.push(ideation.clone());

        match self.drive_post(article, idea, summary, &mut out).await {
            Ok(()) => {
                out.report.status = PostStatus::Completed;
                log::info!(
                    "Post {} completed (passed: {}, degraded: {})",
                    out.post_id().unwrap_or("-"),
                    out.report.passed,
                    out.report.degraded
                );
            }
            Err(e) => {
                log::error!("Post for idea {} failed: {}", idea.id, e);
                out.report.status = PostStatus::Failed;
                out.report.error = Some(e.to_string());
            }
        }

        if let Some(post_id) = out.report.post_id.clone() {
            if let Err(e) = self.save(&post_id, "validation_report", &out.report) {
                log::warn!("Failed to persist validation report for {}: {}", post_id, e);
            }
        }
        out
    }

    async fn drive_post(
        &self,
        article: &Article,
        idea: &Idea,
        summary: &ArticleSummary,
        out: &mut PostOutcome,
    ) -> Result<()> {
        // Phase 2: configuration
        self.check_cancelled(Phase::Configuration)?;
        let mut record = PhaseRecord::new(Phase::Configuration);
        let result = self.configure(article, idea, summary, &mut record);
        out.report.push(record);
        let mut brief = result?;
        out.report.post_id = Some(brief.post_id.clone());
        self.save(&brief.post_id, "coherence_brief", &brief)?;
        out.brief = Some(brief.clone());

        // Phase 3: post creation
        self.check_cancelled(Phase::PostCreation)?;
        let mut record = PhaseRecord::new(Phase::PostCreation);
        let result = self.create_structure(&brief, &mut record).await;
        out.report.push(record);
        let structure = result?;
        self.save(&brief.post_id, "narrative_structure", &defaults::strip_selection(&structure))?;
        self.save(&brief.post_id, "narrative_structure_enriched", &structure)?;
        brief.enrich_narrative(structure)?;
        self.save(&brief.post_id, "coherence_brief", &brief)?;
        out.brief = Some(brief.clone());

        // Phase 4: slide generation
        self.check_cancelled(Phase::SlideGeneration)?;
        let mut record = PhaseRecord::new(Phase::SlideGeneration);
        let result = self.generate_slides(&mut brief, &mut record).await;
        out.report.push(record);
        let batch = result?;
        self.save(&brief.post_id, "slide_content", &batch.contents)?;
        self.save(&brief.post_id, "visual_specs", &batch.visuals)?;
        self.save(&brief.post_id, "coherence_brief", &brief)?;
        out.brief = Some(brief.clone());
        out.slide_contents = batch.contents;
        out.visual_specs = batch.visuals;

        // Phase 5: finalization
        self.check_cancelled(Phase::Finalization)?;
        let mut record = PhaseRecord::new(Phase::Finalization);
        let result = self
            .finalize(&mut brief, &out.slide_contents, &out.visual_specs, &mut record)
            .await;
        out.report.push(record);
        let (caption, quality) = result?;
        self.save(&brief.post_id, "caption", &caption)?;
        self.save(&brief.post_id, "coherence_brief", &brief)?;
        out.report.passed = quality.passed;
        out.report.quality = Some(quality);
        out.caption = Some(caption);
        out.brief = Some(brief);
        Ok(())
    }

    /// Phase 2. Deterministic; a bad idea is a data error, not a retry.
    /// Blank brief fields left by a thin summary are filled from the article.
    fn configure(
        &self,
        article: &Article,
        idea: &Idea,
        summary: &ArticleSummary,
        record: &mut PhaseRecord,
    ) -> Result<CoherenceBrief> {
        record.begin_attempt();
        let mut brief = CoherenceBrief::create_with_profile(idea, summary, &self.profile).map_err(|e| {
            record.fail([e.to_string()]);
            e
        })?;
        let verdict = PhaseGate::check_configuration(&brief);
        if verdict.is_pass() {
            record.pass();
            return Ok(brief);
        }

        record.fail(verdict.reasons());
        let filled = brief.fill_creation_gaps(&article.title, &article.text)?;
        let verdict = PhaseGate::check_configuration(&brief);
        if !verdict.is_pass() {
            record.fail(verdict.reasons());
            return Err(SlidecraftError::ValidationGate {
                phase: Phase::Configuration.to_string(),
                reasons: verdict.reasons(),
            });
        }
        record.default_applied(format!("filled empty brief fields from the article: {}", filled.join(", ")));
        Ok(brief)
    }

    /// Phase 3. Plan the slides and select a template for each.
    async fn create_structure(
        &self,
        brief: &CoherenceBrief,
        record: &mut PhaseRecord,
    ) -> Result<NarrativeStructure> {
        let gate = &self.config.gate;
        let selector = &self.selector;
        let format = brief.format;
        let profile = &SelectionProfile::from_brief(brief);
        let context = &brief.context_for(Role::NarrativeArchitect);

        let outcome = run_gated(Phase::PostCreation, &self.config, record, |feedback| {
            let prompt = prompts::narrative(context, format, gate.min_slides, feedback.as_ref());
            let generator = Arc::clone(&self.generator);
            async move {
                let raw = generator.generate(&prompt).await?;
                let mut structure: NarrativeStructure =
                    parse_reply(&raw).map_err(|reason| parse_failure(Phase::PostCreation, reason))?;
                let verdict = PhaseGate::check_structure(&structure, format, gate);
                if !verdict.is_pass() {
                    return Ok((structure, verdict));
                }
                selector.select_all(&mut structure, profile)?;
                let verdict = PhaseGate::check_selection(&structure, gate);
                Ok((structure, verdict))
            }
        })
        .await?;

        let mut structure = match outcome {
            Gated::Passed(structure) => structure,
            Gated::Exhausted(Some(structure))
                if PhaseGate::check_structure(&structure, format, gate).is_pass()
                    && structure.slides.iter().all(|s| s.is_selected()) =>
            {
                let low: Vec<String> = structure
                    .slides
                    .iter()
                    .filter(|s| s.confidence.unwrap_or(0.0) <= gate.min_confidence)
                    .map(|s| s.slide_number.to_string())
                    .collect();
                record.default_applied(format!(
                    "accepted low-confidence template selections for slides {}",
                    low.join(", ")
                ));
                structure
            }
            Gated::Exhausted(_) => {
                let mut structure = defaults::default_structure(brief);
                let low = selector.select_all(&mut structure, profile)?;
                record.default_applied(format!(
                    "no usable structure produced; using the generic {}-slide structure",
                    structure.slides.len()
                ));
                if !low.is_empty() {
                    record.warn(format!("low-confidence selections on default slides {:?}", low));
                }
                structure
            }
        };

        defaults::ensure_slots(&mut structure, selector.library());
        Ok(structure)
    }

    /// Phase 4. Copy and visuals for every slide, generated concurrently.
    async fn generate_slides(&self, brief: &mut CoherenceBrief, record: &mut PhaseRecord) -> Result<SlideBatch> {
        let structure = brief
            .narrative_structure()
            .cloned()
            .ok_or_else(|| SlidecraftError::OutOfOrderEnrichment {
                field: "copy_guidelines".to_string(),
                reason: "requires narrative_structure first".to_string(),
            })?;

        let copy = defaults::copy_guidelines(brief);
        let cta = defaults::cta_guidelines(brief, &structure);
        brief.enrich_copy(copy, cta)?;
        let visual = defaults::visual_preferences(brief);
        brief.enrich_visual(visual)?;

        let gate = &self.config.gate;
        let library = self.selector.library();
        let structure = &structure;
        let copy_context = &brief.context_for(Role::Copywriter);
        let visual_context = &brief.context_for(Role::VisualComposer);

        let outcome = run_gated(Phase::SlideGeneration, &self.config, record, |feedback| {
            let copy_prompts: Vec<Prompt> = structure
                .slides
                .iter()
                .map(|slide| {
                    let template = slide.template_id.as_deref().and_then(|id| library.get(id));
                    prompts::slide_copy(copy_context, slide, template, feedback.as_ref())
                })
                .collect();
            let visual_prompts: Vec<Prompt> = structure
                .slides
                .iter()
                .map(|slide| prompts::slide_visual(visual_context, slide, feedback.as_ref()))
                .collect();
            let generator = Arc::clone(&self.generator);

            async move {
                let (copies, visuals) = futures::join!(
                    join_all(copy_prompts.iter().map(|p| generator.generate(p))),
                    join_all(visual_prompts.iter().map(|p| generator.generate(p)))
                );

                let total = copies.len() + visuals.len();
                let mut transient: Option<SlidecraftError> = None;
                let mut transient_count = 0usize;
                let mut batch = SlideBatch::default();

                for (slide, reply) in structure.slides.iter().zip(copies) {
                    let raw = match reply {
                        Ok(raw) => raw,
                        Err(e) if e.is_recoverable() => {
                            log::warn!("Copy for slide {} failed: {}", slide.slide_number, e);
                            transient_count += 1;
                            transient = Some(e);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    match parse_reply::<CopyReply>(&raw) {
                        Ok(reply) => batch.contents.push(SlideContent {
                            slide_number: slide.slide_number,
                            template_id: slide.template_id.clone(),
                            slots: reply.slots,
                        }),
                        Err(reason) => log::warn!("Copy for slide {}: {}", slide.slide_number, reason),
                    }
                }

                for (slide, reply) in structure.slides.iter().zip(visuals) {
                    let raw = match reply {
                        Ok(raw) => raw,
                        Err(e) if e.is_recoverable() => {
                            log::warn!("Visual for slide {} failed: {}", slide.slide_number, e);
                            transient_count += 1;
                            transient = Some(e);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    match parse_visual(&raw, slide.slide_number) {
                        Ok(spec) => batch.visuals.push(spec),
                        Err(reason) => log::warn!("Visual for slide {}: {}", slide.slide_number, reason),
                    }
                }

                if total > 0 && transient_count == total {
                    if let Some(e) = transient {
                        return Err(e);
                    }
                }

                let verdict = PhaseGate::check_slides(structure, &batch.contents, &batch.visuals, gate);
                Ok((batch, verdict))
            }
        })
        .await?;

        match outcome {
            Gated::Passed(batch) => Ok(batch),
            Gated::Exhausted(last) => {
                let last = last.unwrap_or_default();
                let (contents, content_notes) = defaults::repair_contents(structure, &last.contents, library);
                let (visuals, visual_notes) = defaults::repair_visuals(structure, &last.visuals, brief, gate);
                record.default_applied("slide outputs repaired to fit their constraints");
                for note in content_notes.into_iter().chain(visual_notes) {
                    record.warn(note);
                }
                Ok(SlideBatch { contents, visuals })
            }
        }
    }

    /// Phase 5. Caption under the platform limit, then the quality score.
    async fn finalize(
        &self,
        brief: &mut CoherenceBrief,
        contents: &[SlideContent],
        visuals: &[VisualSpec],
        record: &mut PhaseRecord,
    ) -> Result<(Caption, QualityScore)> {
        brief.enrich_caption(PlatformConstraints::for_platform(brief.platform))?;
        let constraints = &PlatformConstraints::for_platform(brief.platform);
        let context = &brief.context_for(Role::CaptionWriter);
        let slide_text = &contents
            .iter()
            .map(|c| {
                let text: Vec<&str> = c.slots.values().map(String::as_str).collect();
                format!("{}. {}", c.slide_number, text.join(" / "))
            })
            .collect::<Vec<_>>()
            .join("\n");

        let outcome = run_gated(Phase::Finalization, &self.config, record, |feedback| {
            let prompt = prompts::caption(context, slide_text, constraints.caption_max_chars, feedback.as_ref());
            let generator = Arc::clone(&self.generator);
            async move {
                let raw = generator.generate(&prompt).await?;
                let caption: Caption =
                    parse_reply(&raw).map_err(|reason| parse_failure(Phase::Finalization, reason))?;
                let verdict = PhaseGate::check_caption(&caption, constraints);
                Ok((caption, verdict))
            }
        })
        .await?;

        let caption = match outcome {
            Gated::Passed(caption) => caption,
            Gated::Exhausted(last) => {
                let (caption, note) =
                    defaults::repair_caption(last.as_ref(), constraints, brief.cta_guidelines(), brief);
                record.default_applied(note);
                caption
            }
        };

        let quality = PhaseGate::quality_score(brief, contents, visuals, &caption, &self.config.gate);
        if !quality.passed {
            record.warn(format!(
                "quality score {:.2} is not above {:.2}",
                quality.overall, self.config.gate.quality_threshold
            ));
        }
        Ok((caption, quality))
    }

    fn check_cancelled(&self, phase: Phase) -> Result<()> {
        if self.cancel.is_cancelled() {
            log::info!("Cancellation requested before {}", phase);
            return Err(SlidecraftError::Cancelled {
                phase: phase.to_string(),
            });
        }
        Ok(())
    }

    fn save<T: Serialize>(&self, scope: &str, name: &str, value: &T) -> Result<()> {
        self.store.save(&artifact_key(scope, name), &serde_json::to_value(value)?)
    }
}

/// Highest confidence first; ties keep ideation order.
fn rank_ideas(ideas: &[Idea], limit: usize) -> Vec<Idea> {
    let mut ranked = ideas.to_vec();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(limit);
    ranked
}

/// Parse a visual reply, filling in the slide number the model may omit.
fn parse_visual(raw: &str, slide_number: u32) -> std::result::Result<VisualSpec, String> {
    let mut value: Value = parse_reply(raw)?;
    let Some(obj) = value.as_object_mut() else {
        return Err("visual reply is not a JSON object".to_string());
    };
    obj.insert("slide_number".to_string(), Value::from(slide_number));
    serde_json::from_value(value).map_err(|e| format!("visual reply has the wrong shape: {}", e))
}
