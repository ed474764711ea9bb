//! Ollama API client (http://127.0.0.1:11434 by default).
//! Used as a local summarizer backend; non-streaming chat only.

use crate::llm::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

/// Client for Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// POST /api/chat — non-streaming chat completion.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        Ok(data)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let res = self.chat(vec![ChatMessage::user(prompt)]).await?;
        Ok(res.content().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
}

impl ChatResponse {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_content_defaults_to_empty() {
        let r: ChatResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(r.content(), "");
        let r: ChatResponse =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"hi"},"done":true}"#)
                .unwrap();
        assert_eq!(r.content(), "hi");
    }

    #[test]
    fn chat_request_is_non_streaming() {
        let body = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::user("p")],
            stream: false,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["stream"], serde_json::json!(false));
        assert_eq!(v["messages"][0]["role"], "user");
    }
}
