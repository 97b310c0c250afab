use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Chunk size is measured in characters. The upper bound matches the
/// validation limit the email store enforces on stored content.
pub const MAX_CHUNK_SIZE_LIMIT: usize = 5000;

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

fn default_max_chunk_size() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    #[serde(default = "default_max_passages")]
    pub max_passages: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            max_passages: default_max_passages(),
        }
    }
}

fn default_top_k() -> usize {
    10
}
fn default_score_threshold() -> f64 {
    0.35
}
fn default_max_passages() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// `"disabled"` or `"pinecone"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Data-plane host of the index (e.g. `emails-index-abc123.svc.aped-4627.pinecone.io`).
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fixed pause between upsert batches, to stay under provider rate
    /// limits. Not a retry mechanism.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            host: None,
            namespace: default_namespace(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_namespace() -> String {
    "emails".to_string()
}
fn default_batch_size() -> usize {
    100
}
fn default_batch_delay_ms() -> u64 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    /// `"disabled"` or `"openai"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl IndexConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl CompletionConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_chunk_size == 0 {
        anyhow::bail!("chunking.max_chunk_size must be > 0");
    }
    if config.chunking.max_chunk_size > MAX_CHUNK_SIZE_LIMIT {
        anyhow::bail!(
            "chunking.max_chunk_size must be <= {}",
            MAX_CHUNK_SIZE_LIMIT
        );
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if !(0.0..=1.0).contains(&config.retrieval.score_threshold) {
        anyhow::bail!("retrieval.score_threshold must be in [0.0, 1.0]");
    }
    if config.retrieval.max_passages < 1 {
        anyhow::bail!("retrieval.max_passages must be >= 1");
    }

    if config.index.batch_size < 1 {
        anyhow::bail!("index.batch_size must be >= 1");
    }

    match config.index.provider.as_str() {
        "disabled" | "pinecone" => {}
        other => anyhow::bail!(
            "Unknown index provider: '{}'. Must be disabled or pinecone.",
            other
        ),
    }
    if config.index.is_enabled() && config.index.host.is_none() {
        anyhow::bail!(
            "index.host must be specified when provider is '{}'",
            config.index.provider
        );
    }

    match config.completion.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.completion.is_enabled() && config.completion.model.is_none() {
        anyhow::bail!(
            "completion.model must be specified when provider is '{}'",
            config.completion.provider
        );
    }

    Ok(())
}
