//! Google Gemini client (generateContent, non-streaming).

use crate::llm::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Client for the Gemini generateContent API. Authenticates with an API key header.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        Self {
            base_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST /models/{model}:generateContent with a single user turn.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateResponse = res.json().await?;
        data.text()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    /// Blocked prompts come back with no candidates.
    fn text(self) -> Result<String, LlmError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("no candidates in response".to_string()))?;
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"a"},{"text":"b"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.text().unwrap(), "ab");
    }

    #[test]
    fn response_without_candidates_is_malformed() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(resp.text(), Err(LlmError::Malformed(_))));
    }

    #[test]
    fn new_defaults_model_and_trims_base_url() {
        let c = GeminiClient::new("k".into(), Some("  ".into()), Some("http://x/v1beta/".into()));
        assert_eq!(c.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(c.base_url, "http://x/v1beta");
    }
}
