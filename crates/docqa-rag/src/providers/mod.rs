//! Provider abstractions for embeddings and LLM completion
//!
//! Backends are picked once at startup from configuration; everything downstream
//! holds trait objects.

pub mod embedding;
pub mod hashing;
pub mod llm;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, LlmBackend, RagConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use openai::OpenAiLlm;

/// Build the configured embedding provider
pub fn build_embedder(config: &RagConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.embeddings.provider {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::from_client(
            Arc::new(OllamaClient::new(&config.llm)?),
            config.embeddings.dimensions,
            config.embeddings.model.clone(),
        )),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embeddings.dimensions)),
    };

    tracing::info!(
        "Embedding provider: {} ({} dimensions)",
        embedder.name(),
        embedder.dimensions()
    );
    Ok(embedder)
}

/// Build the configured LLM provider
pub fn build_llm(config: &RagConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.llm.provider {
        LlmBackend::Ollama => Arc::new(OllamaLlm::new(&config.llm)?),
        LlmBackend::OpenAi => Arc::new(OpenAiLlm::new(&config.llm)?),
    };

    tracing::info!("LLM provider: {} (model {})", llm.name(), llm.model());
    Ok(llm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_selects_backends() {
        let mut config = RagConfig::default();
        config.embeddings.provider = EmbeddingBackend::Hashing;
        config.embeddings.dimensions = 48;
        config.llm.provider = LlmBackend::OpenAi;

        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.name(), "hashing");
        assert_eq!(embedder.dimensions(), 48);

        let llm = build_llm(&config).unwrap();
        assert_eq!(llm.name(), "openai");
    }
}
