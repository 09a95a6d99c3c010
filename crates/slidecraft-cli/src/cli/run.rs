use crate::cli::RunArgs;
use crate::config::{EmbeddingSettings, SlidecraftConfig};
use crate::llm::ChatCompletionsClient;
use anyhow::Result;
use slidecraft_core::{
    Article, ArticleOutcome, DocumentStore, EmbeddingService, FastEmbedService, HashingEmbedder,
    Orchestrator, PostStatus, RedbStore, TemplateLibrary, TemplateSelector,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(args: RunArgs, mut config: SlidecraftConfig) -> Result<()> {
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if let Some(base) = args.api_base {
        config.llm.api_base = base;
    }
    if let Some(posts) = args.posts {
        config.pipeline = config.pipeline.with_posts_per_article(posts);
    }
    if args.hashing_embedder {
        config.embedding.hashing_only = true;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "));
    }
    config.ensure_data_dir()?;

    let article = read_article(&args.article, args.title.as_deref())?;
    info!("Article: '{}' ({} chars)", article.title, article.text.len());

    if config.llm.api_key().is_none() {
        warn!("${} is not set; sending requests without a key", config.llm.api_key_env);
    }
    let generator = Arc::new(ChatCompletionsClient::new(&config.llm)?);
    info!("LLM: {} via {}", config.llm.model, generator.endpoint());

    let embedder = load_embedder(&config.embedding);
    let selector = TemplateSelector::with_embedder(
        Arc::new(TemplateLibrary::builtin()),
        Some(embedder),
        config.selector.clone(),
    );
    info!("Template selection: {} scoring", selector.method());

    info!("Opening database {:?}", config.db_path());
    let store = Arc::new(RedbStore::open(config.db_path())?);

    let orchestrator = Orchestrator::new(generator, selector, store.clone(), config.pipeline.clone())
        .with_profile(config.brand.clone());

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current phase");
            token.cancel();
        }
    });

    let outcome = orchestrator.run_article(&article).await?;
    print_summary(&outcome);

    if let Some(out) = &args.out {
        let written = export_run(store.as_ref(), &outcome, out)?;
        println!("Wrote {} artifacts to {}", written, out.display());
    }

    if outcome.posts.iter().all(|p| p.status() == PostStatus::Failed) {
        anyhow::bail!("every post failed");
    }
    Ok(())
}

/// FastEmbed when available, otherwise the hashing embedder.
fn load_embedder(settings: &EmbeddingSettings) -> Arc<dyn EmbeddingService> {
    if settings.hashing_only {
        return Arc::new(HashingEmbedder::default());
    }
    info!("Loading embedding model {}...", settings.model);
    match FastEmbedService::from_name(&settings.model) {
        Ok(service) => {
            info!("Embedding model loaded: {}", service.model_name());
            Arc::new(service)
        }
        Err(e) => {
            warn!("{}; falling back to hashing embedder", e);
            Arc::new(HashingEmbedder::default())
        }
    }
}

/// Plain text takes its title from the first non-empty line. JSON must
/// carry `title` and `text`.
pub fn read_article(path: &Path, title: Option<&str>) -> Result<Article> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

    let mut article = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str::<Article>(&raw)
            .map_err(|e| anyhow::anyhow!("{} is not an article document: {}", path.display(), e))?
    } else {
        let first = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
        Article::new(first.trim_start_matches('#').trim(), raw.trim())
    };

    if let Some(title) = title {
        article.title = title.to_string();
    }
    if article.text.trim().is_empty() {
        anyhow::bail!("{} has no article text", path.display());
    }
    Ok(article)
}

fn print_summary(outcome: &ArticleOutcome) {
    println!();
    println!("Run {}", outcome.run_id);
    println!("{}", "─".repeat(50));
    println!("Ideas:   {:>4}", outcome.ideas.len());
    println!("Posts:   {:>4}", outcome.posts.len());
    for post in &outcome.posts {
        let report = &post.report;
        let id = post.post_id().unwrap_or("-");
        match post.status() {
            PostStatus::Completed => {
                let score = report.quality.as_ref().map(|q| q.overall).unwrap_or_default();
                println!(
                    "  {}  completed  slides={} quality={:.2}{}{}",
                    id,
                    post.slide_contents.len(),
                    score,
                    if report.passed { "" } else { " (below threshold)" },
                    if report.degraded { " degraded" } else { "" },
                );
            }
            PostStatus::Failed => {
                println!(
                    "  {}  failed     {}",
                    id,
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        for phase in &report.phases {
            for warning in &phase.warnings {
                println!("      [{}] {}", phase.phase, warning);
            }
        }
    }
    println!("{}", "─".repeat(50));
    println!();
}

/// Copy the run's artifacts out of the store as `<out>/<scope>/<name>.json`.
pub fn export_run(store: &dyn DocumentStore, outcome: &ArticleOutcome, out: &Path) -> Result<usize> {
    let mut scopes = vec![outcome.run_id.clone()];
    scopes.extend(outcome.posts.iter().filter_map(|p| p.post_id().map(str::to_string)));

    let mut written = 0;
    for scope in scopes {
        for key in store.keys(&format!("{}/", scope))? {
            let Some(doc) = store.load(&key)? else {
                continue;
            };
            let path: PathBuf = out.join(format!("{}.json", key));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidecraft_core::{artifact_key, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn text_article_takes_title_from_first_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "\n# Deep work for founders\n\nFocus is the moat.\n").unwrap();

        let article = read_article(&path, None).unwrap();
        assert_eq!(article.title, "Deep work for founders");
        assert!(article.text.ends_with("Focus is the moat."));

        let article = read_article(&path, Some("Override")).unwrap();
        assert_eq!(article.title, "Override");
    }

    #[test]
    fn json_article_and_empty_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"title":"T","text":"Body"}"#).unwrap();
        assert_eq!(read_article(&path, None).unwrap(), Article::new("T", "Body"));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "   \n").unwrap();
        assert!(read_article(&empty, None).is_err());
    }

    #[test]
    fn hashing_only_skips_fastembed() {
        let settings = EmbeddingSettings {
            hashing_only: true,
            ..EmbeddingSettings::default()
        };
        let embedder = load_embedder(&settings);
        assert_eq!(embedder.dimension(), HashingEmbedder::default().dimension());
    }

    #[test]
    fn export_writes_run_and_post_scopes_only() {
        let store = MemoryStore::new();
        store.save(&artifact_key("run-1", "post_ideas"), &json!({"ideas": []})).unwrap();
        store.save(&artifact_key("other-run", "post_ideas"), &json!({})).unwrap();

        let outcome = ArticleOutcome {
            run_id: "run-1".to_string(),
            summary: Default::default(),
            ideas: Vec::new(),
            posts: Vec::new(),
        };
        let dir = TempDir::new().unwrap();
        let written = export_run(&store, &outcome, dir.path()).unwrap();

        assert_eq!(written, 1);
        let saved = std::fs::read_to_string(dir.path().join("run-1/post_ideas.json")).unwrap();
        assert!(saved.contains("ideas"));
        assert!(!dir.path().join("other-run").exists());
    }
}
