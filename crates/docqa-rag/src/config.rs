//! Configuration for the document Q&A system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::DistanceMetric;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Collection storage configuration
    pub storage: StorageConfig,
    /// Processing configuration
    pub processing: ProcessingConfig,
    /// Summary / challenge settings
    pub assistant: AssistantConfig,
}

impl RagConfig {
    /// Load configuration: defaults, then an optional TOML file, then env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `DOCQA_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DOCQA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCQA_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("DOCQA_PORT is not a port: {}", port)))?;
        }
        if let Some(root) = lookup("DOCQA_STORAGE_ROOT") {
            self.storage.root = PathBuf::from(root);
        }
        if let Some(size) = lookup("DOCQA_CHUNK_SIZE") {
            self.chunking.chunk_size = size
                .parse()
                .map_err(|_| Error::Config(format!("DOCQA_CHUNK_SIZE is not a number: {}", size)))?;
        }
        if let Some(provider) = lookup("DOCQA_LLM_PROVIDER") {
            self.llm.provider = match provider.to_lowercase().as_str() {
                "ollama" => LlmBackend::Ollama,
                "openai" => LlmBackend::OpenAi,
                other => return Err(Error::Config(format!("Unknown LLM provider: {}", other))),
            };
        }
        if let Some(url) = lookup("DOCQA_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("DOCQA_LLM_MODEL") {
            self.llm.generate_model = model;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            if self.llm.api_key.is_none() {
                self.llm.api_key = Some(key);
            }
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be greater than 0".into()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be greater than 0".into()));
        }
        if self.server.max_upload_size == 0 {
            return Err(Error::Config("server.max_upload_size must be greater than 0".into()));
        }
        if self.processing.default_top_k == 0 {
            return Err(Error::Config("processing.default_top_k must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 10MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length in characters
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000 }
    }
}

/// Which embedding function backs the chunk store
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama embeddings endpoint
    #[default]
    Ollama,
    /// Offline feature-hashing embedder
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding backend
    pub provider: EmbeddingBackend,
    /// Model name (Ollama)
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Ollama,
            model: "all-minilm".to_string(),
            dimensions: 384,
        }
    }
}

/// Which text-generation API answers prompts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    #[serde(rename = "ollama")]
    Ollama,
    /// Any OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAi,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider selected at startup
    pub provider: LlmBackend,
    /// Base URL (Ollama root or OpenAI-compatible `/v1` root)
    pub base_url: String,
    /// API key for OpenAI-compatible providers
    pub api_key: Option<String>,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Collection storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for collections and the document registry
    pub root: PathBuf,
    /// Distance used for nearest-neighbour ranking
    pub distance: DistanceMetric,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("data"))
            .join("docqa-rag");

        Self {
            root,
            distance: DistanceMetric::L2,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Timeout for a whole upload (extract + chunk + embed + store)
    pub ingest_timeout_secs: u64,
    /// Timeout for gathering retrieval context for one request
    pub retrieval_timeout_secs: u64,
    /// Chunks retrieved per document when the caller gives no top_k
    pub default_top_k: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            ingest_timeout_secs: 300,
            retrieval_timeout_secs: 30,
            default_top_k: 5,
        }
    }
}

/// Summary and challenge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Word budget for generated summaries
    pub summary_max_words: usize,
    /// Default number of challenge questions
    pub num_challenge_questions: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            summary_max_words: 150,
            num_challenge_questions: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.storage.distance, DistanceMetric::L2);
    }

    #[test]
    fn test_partial_toml() {
        let config = RagConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 250

            [llm]
            provider = "openai"
            base_url = "https://api.openai.com/v1"

            [storage]
            root = "/tmp/docqa"
            distance = "cosine"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 250);
        assert_eq!(config.llm.provider, LlmBackend::OpenAi);
        assert_eq!(config.storage.root, PathBuf::from("/tmp/docqa"));
        assert_eq!(config.storage.distance, DistanceMetric::Cosine);
        // Untouched sections keep their defaults
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DOCQA_PORT", "9100"),
            ("DOCQA_CHUNK_SIZE", "64"),
            ("DOCQA_LLM_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.chunking.chunk_size, 64);
        assert_eq!(config.llm.provider, LlmBackend::OpenAi);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_bad_env_override() {
        let mut config = RagConfig::default();
        let err = config
            .apply_overrides(|k| (k == "DOCQA_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
