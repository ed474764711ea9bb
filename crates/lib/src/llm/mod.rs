//! Text generation backends used to summarize reports.
//!
//! The summarizer only needs `generate(prompt) -> text`; each backend implements
//! [`TextGenerator`] and reports failures as [`LlmError`].

mod gemini;
mod ollama;

use async_trait::async_trait;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL};
pub use ollama::{ChatMessage, ChatResponse, OllamaClient, DEFAULT_OLLAMA_MODEL};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm api error: {0}")]
    Api(String),
    #[error("llm response malformed: {0}")]
    Malformed(String),
}

/// A backend that turns one prompt into one completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name for logs and health output (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a completion. An empty string is a valid return here; callers decide what it means.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
