//! Example: full pipeline against a canned generator
//!
//! Run with: RUST_LOG=info cargo run --example offline_run
//! No network or model download: uses the hashing embedder and canned replies.

use async_trait::async_trait;
use serde_json::json;
use slidecraft_core::pipeline::{Prompt, Task, TextGenerator};
use slidecraft_core::storage::{DocumentStore, RedbStore};
use slidecraft_core::*;
use std::sync::Arc;
use tempfile::TempDir;

struct CannedGenerator {
    library: TemplateLibrary,
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, prompt: &Prompt) -> slidecraft_core::Result<String> {
        let reply = match prompt.task {
            Task::Ideas => json!({
                "article_summary": {
                    "title": "Why startups fail",
                    "key_points": ["Focus beats funding", "Most teams spread too thin"],
                    "insights": [{"id": "ins-1", "text": "73% of failed startups lacked focus"}],
                    "main_themes": ["focus", "execution"],
                    "keywords": ["focus", "startup", "execution"],
                },
                "ideas": [
                    {"id": "idea-1", "platform": "linkedin", "tone": "authoritative",
                     "persona": "Early-stage founders", "angle": "Focus is the moat",
                     "hook": "73% of startups die from distraction",
                     "narrative_arc": "Problem, proof, fix, call to action",
                     "insight_ids": ["ins-1"], "estimated_slides": 5, "confidence": 0.9},
                    {"id": "idea-2", "platform": "linkedin", "tone": "casual",
                     "persona": "Early-stage founders", "angle": "Say no more often",
                     "hook": "Your roadmap is too long",
                     "narrative_arc": "Myth, truth, habit",
                     "insight_ids": [], "estimated_slides": 5, "confidence": 0.7},
                    {"id": "idea-3", "platform": "instagram", "tone": "inspirational",
                     "persona": "Solo founders", "angle": "One metric that matters",
                     "hook": "Pick one number",
                     "narrative_arc": "Question, answer, example",
                     "insight_ids": [], "estimated_slides": 5, "confidence": 0.6},
                ],
            }),
            Task::Narrative => {
                let plan = [
                    ("H01", "hook", None),
                    ("VD01", "value", Some("data")),
                    ("VI01", "value", Some("insight")),
                    ("VS01", "value", Some("solution")),
                    ("CTA01", "cta", None),
                ];
                let slides: Vec<_> = plan
                    .iter()
                    .enumerate()
                    .map(|(i, (id, template_type, subtype))| {
                        let purpose = self
                            .library
                            .get(id)
                            .map(|t| t.semantic_description.clone())
                            .unwrap_or_default();
                        json!({
                            "slide_number": i + 1,
                            "template_type": template_type,
                            "value_subtype": subtype,
                            "purpose": purpose,
                            "content_slots": {"headline": 80, "body": 200},
                        })
                    })
                    .collect();
                json!({"pacing": "fast", "transition_style": "smooth", "slides": slides})
            }
            Task::SlideCopy => json!({"slots": {
                "headline": format!("Slide {}: focus wins", prompt.slide_number.unwrap_or(0)),
                "body": "Teams that cut scope ship faster and learn sooner.",
            }}),
            Task::SlideVisual => json!({
                "description": "Single lit desk in a dark open-plan office",
                "layout": "centered",
                "palette": ["navy", "amber"],
                "mood": "calm",
                "elements": ["desk", "lamp"],
            }),
            Task::Caption => json!({
                "text": "Focus beats funding. Which project will you drop this week?",
                "hashtags": ["startups", "focus", "founders"],
            }),
        };
        Ok(reply.to_string())
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(RedbStore::open(temp_dir.path().join("offline_run.redb")).unwrap());

    let selector = TemplateSelector::with_embedder(
        Arc::new(TemplateLibrary::builtin()),
        Some(Arc::new(HashingEmbedder::default())),
        SelectorConfig::default(),
    );
    let generator = Arc::new(CannedGenerator {
        library: TemplateLibrary::builtin(),
    });
    let config = PipelineConfig::new().with_posts_per_article(2);

    let orchestrator = Orchestrator::new(generator, selector, store.clone(), config);
    let article = Article::new(
        "Why startups fail",
        "Most startups fail from lack of focus, not lack of funding.",
    );

    println!("Slidecraft offline run\n");
    let outcome = orchestrator.run_article(&article).await.unwrap();

    for post in &outcome.posts {
        println!(
            "post {} ({:?})",
            post.post_id().unwrap_or("-"),
            post.status()
        );
        for content in &post.slide_contents {
            println!(
                "  #{} [{}] {}",
                content.slide_number,
                content.template_id.as_deref().unwrap_or("-"),
                content.slots.get("headline").map(String::as_str).unwrap_or("")
            );
        }
        if let Some(q) = &post.report.quality {
            println!("  quality {:.2} (passed: {})", q.overall, q.passed);
        }
        if let Some(id) = post.post_id() {
            let keys = store.keys(&format!("{}/", id)).unwrap();
            println!("  artifacts: {}", keys.join(", "));
        }
        println!();
    }
}
