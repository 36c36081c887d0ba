use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default token window size
pub const DEFAULT_MAX_TOKENS: usize = 400;
/// Default overlap between consecutive windows
pub const DEFAULT_OVERLAP: usize = 50;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RepolensConfig {
    pub database: Option<String>,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub resolver: ResolverConfig,
    pub ingest: IngestConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Reject settings under which the window walk would never advance
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_tokens == 0 {
            return Err(crate::Error::Config("chunking.max_tokens must be greater than 0".into()));
        }
        if self.overlap >= self.max_tokens {
            return Err(crate::Error::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_tokens ({})",
                self.overlap, self.max_tokens
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub fetch_multiplier: usize,
    pub neighbor_depth: usize,
    pub max_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            fetch_multiplier: 3,
            neighbor_depth: 2,
            max_top_k: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extensions tried, in order, when resolving relative imports
    pub extensions: Vec<String>,
    /// Directory entry-point file names tried after the plain extensions
    pub index_names: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extensions: [".js", ".ts", ".jsx", ".tsx", ".py"].iter().map(|s| s.to_string()).collect(),
            index_names: vec!["index".to_string(), "__init__".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Extra gitignore-style patterns excluded on top of the built-in filter
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    OpenAi,
    Ollama,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub model: String,
    pub batch_size: usize,
    /// Service root; the backend's public default when unset
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            model: "text-embedding-3-large".to_string(),
            batch_size: 32,
            base_url: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.backend {
            EmbeddingBackend::OpenAi | EmbeddingBackend::Local => OPENAI_BASE_URL,
            EmbeddingBackend::Ollama => OLLAMA_BASE_URL,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    #[default]
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: GenerationBackend,
    pub model: String,
    pub max_tokens: usize,
    pub base_url: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::OpenAi,
            model: "gpt-4o".to_string(),
            max_tokens: 800,
            base_url: None,
        }
    }
}

impl GenerationConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.backend {
            GenerationBackend::OpenAi => OPENAI_BASE_URL,
            GenerationBackend::Ollama => OLLAMA_BASE_URL,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostConfig {
    pub api_url: String,
    pub raw_url: String,
    pub timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            timeout_secs: 60,
        }
    }
}

impl RepolensConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(Path::new(".")))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("repolens.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".repolens").join("repolens.db")
}

/// Load the config file, falling back to defaults when it does not exist
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RepolensConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(RepolensConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RepolensConfig = toml::from_str(&contents)?;
    config.chunking.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &RepolensConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".repolens/";

    let mut content = String::new();
    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if existing.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        content.push_str(&existing);
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}
