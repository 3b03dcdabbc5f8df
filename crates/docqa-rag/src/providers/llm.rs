//! LLM provider trait for prompt completion

use async_trait::async_trait;
use crate::error::Result;

/// Trait for LLM-based text generation
///
/// Prompts are assembled by the assistant layer; providers only complete them.
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (llama3, phi3, etc.)
/// - `OpenAiLlm`: Any OpenAI-compatible chat completions API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
