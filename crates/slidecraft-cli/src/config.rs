use anyhow::Context;
use serde::{Deserialize, Serialize};
use slidecraft_core::{BrandProfile, PipelineConfig, SelectorConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Chat-completions provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "SLIDECRAFT_API_KEY".to_string(),
            temperature: 0.7,
            request_timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// FastEmbed model name, e.g. `BAAI/bge-small-en-v1.5`.
    pub model: String,
    /// Skip FastEmbed and use the offline hashing embedder.
    pub hashing_only: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "BAAI/bge-small-en-v1.5".to_string(),
            hashing_only: false,
        }
    }
}

/// Contents of `slidecraft.toml`. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlidecraftConfig {
    pub data_dir: PathBuf,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub pipeline: PipelineConfig,
    pub selector: SelectorConfig,
    pub brand: BrandProfile,
}

impl Default for SlidecraftConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            pipeline: PipelineConfig::default(),
            selector: SelectorConfig::default(),
            brand: BrandProfile::default(),
        }
    }
}

impl SlidecraftConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: SlidecraftConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    /// A missing file means defaults. A file that exists must parse.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Apply command-line and environment overrides.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("slidecraft.redb")
    }

    /// Collect every problem instead of stopping at the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.llm.api_base.trim().is_empty() {
            errors.push("[llm] api_base must not be empty".to_string());
        }
        if self.llm.model.trim().is_empty() {
            errors.push("[llm] model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push("[llm] temperature must be within [0, 2]".to_string());
        }
        if self.llm.request_timeout_secs == 0 {
            errors.push("[llm] request_timeout_secs must be greater than 0".to_string());
        }
        if let Err(e) = self.pipeline.validate() {
            errors.push(format!("[pipeline] {}", e));
        }
        if let Err(e) = self.selector.validate() {
            errors.push(format!("[selector] {}", e));
        }
        errors
    }

    pub fn ensure_data_dir(&self) -> anyhow::Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: SlidecraftConfig = toml::from_str("").unwrap();
        assert_eq!(config, SlidecraftConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SlidecraftConfig = toml::from_str(
            r#"
            data_dir = "/tmp/slides"

            [llm]
            model = "llama3.1"
            api_base = "http://localhost:11434/v1"

            [pipeline]
            max_retries = 1

            [pipeline.gate]
            min_slides = 6

            [brand]
            values = ["clarity"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/slides"));
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.api_key_env, "SLIDECRAFT_API_KEY");
        assert_eq!(config.pipeline.max_retries, 1);
        assert_eq!(config.pipeline.gate.min_slides, 6);
        assert_eq!(config.pipeline.gate.min_ideas, 3);
        assert_eq!(config.brand.values, vec!["clarity"]);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/slides/slidecraft.redb"));
    }

    #[test]
    fn validate_collects_every_error() {
        let mut config = SlidecraftConfig::default();
        config.llm.model = String::new();
        config.llm.temperature = 3.0;
        config.selector.semantic_weight = 0.5;
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("[selector]")));
    }

    #[test]
    fn load_or_default_uses_defaults_only_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(SlidecraftConfig::load_or_default(&missing).unwrap(), SlidecraftConfig::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[llm\nmodel = ").unwrap();
        let err = SlidecraftConfig::load_or_default(&broken).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[llm]\nmodel = \"local-7b\"\n").unwrap();
        assert_eq!(SlidecraftConfig::load_or_default(&good).unwrap().llm.model, "local-7b");
    }

    #[test]
    fn data_dir_override_wins() {
        let config = SlidecraftConfig::default().with_data_dir(Some(PathBuf::from("/srv/sc")));
        assert_eq!(config.db_path(), PathBuf::from("/srv/sc/slidecraft.redb"));
        assert_eq!(
            SlidecraftConfig::default().with_data_dir(None).data_dir,
            PathBuf::from("./data")
        );
    }
}
