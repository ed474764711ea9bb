//! Summarization adapter: turns collected answers into the text sent back to the user.
//!
//! Total by construction. Without a generator the answers are listed verbatim; with one,
//! any error, timeout or empty completion becomes [`SUMMARY_UNAVAILABLE`].

use crate::config::{self, Config, SummarizerBackend};
use crate::llm::{GeminiClient, LlmError, OllamaClient, TextGenerator};
use crate::report::{self, Answers};
use std::sync::Arc;
use std::time::Duration;

/// Sent instead of a summary when the generator fails or returns nothing.
pub const SUMMARY_UNAVAILABLE: &str = "Özet oluşturulamadı.";

#[derive(Clone)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Summarizer that always renders the plain listing.
    pub fn fallback_only() -> Self {
        Self::new(None, config::DEFAULT_SUMMARIZER_TIMEOUT)
    }

    /// Build the summarizer from resolved configuration. Called once at startup.
    pub fn from_config(config: &Config) -> Self {
        let timeout = config::resolve_summarizer_timeout(config);
        let s = &config.summarizer;
        let generator: Option<Arc<dyn TextGenerator>> = match s.backend {
            SummarizerBackend::Gemini => match config::resolve_google_api_key(config) {
                Some(key) => Some(Arc::new(GeminiClient::new(
                    key,
                    s.model.clone(),
                    s.base_url.clone(),
                ))),
                None => {
                    log::warn!("GOOGLE_API_KEY is not set; falling back to plain text summary");
                    None
                }
            },
            SummarizerBackend::Ollama => Some(Arc::new(OllamaClient::new(
                s.base_url.clone(),
                s.model.clone(),
            ))),
        };
        if let Some(ref g) = generator {
            log::info!("summarizer: using {} backend", g.name());
        }
        Self::new(generator, timeout)
    }

    /// Backend name, or "fallback" when no generator is configured.
    pub fn backend_name(&self) -> &str {
        self.generator.as_deref().map(|g| g.name()).unwrap_or("fallback")
    }

    pub fn is_generative(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn summarize(&self, answers: &Answers) -> String {
        let Some(generator) = self.generator.as_deref() else {
            return report::render_fallback(answers);
        };
        let request = report::build_request(answers);
        let result: Result<String, LlmError> =
            match tokio::time::timeout(self.timeout, generator.generate(&request)).await {
                Ok(r) => r,
                Err(_) => {
                    log::warn!(
                        "summarizer: {} did not answer within {:?}",
                        generator.name(),
                        self.timeout
                    );
                    return SUMMARY_UNAVAILABLE.to_string();
                }
            };
        match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                log::warn!("summarizer: {} returned an empty completion", generator.name());
                SUMMARY_UNAVAILABLE.to_string()
            }
            Err(e) => {
                log::warn!("summarizer: {} request failed: {}", generator.name(), e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ENABLE_SUMMARY_NOTE;
    use crate::script::Step;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct StubGenerator {
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail => Err(LlmError::Api("503 overloaded".to_string())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            }
        }
    }

    fn answers() -> Answers {
        [
            (Step::DateRange, "1-5 May"),
            (Step::DoneThisWeek, "X"),
            (Step::CompletedItems, "Y"),
            (Step::NextWeekPlan, "Z"),
            (Step::Blockers, "W"),
        ]
        .into_iter()
        .map(|(s, v)| (s, v.to_string()))
        .collect()
    }

    fn with(stub: &Arc<StubGenerator>) -> Summarizer {
        Summarizer::new(Some(stub.clone()), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn fallback_is_deterministic_and_complete() {
        let s = Summarizer::fallback_only();
        let first = s.summarize(&answers()).await;
        let second = s.summarize(&answers()).await;
        assert_eq!(first, second);
        for v in ["1-5 May", "X", "Y", "Z", "W"] {
            assert!(first.contains(v));
        }
        assert!(first.contains(ENABLE_SUMMARY_NOTE));
        assert_eq!(s.backend_name(), "fallback");
    }

    #[tokio::test]
    async fn generated_text_is_trimmed_and_prompt_is_the_request() {
        let stub = StubGenerator::new(Reply::Text("\n  • özet  \n"));
        let out = with(&stub).summarize(&answers()).await;
        assert_eq!(out, "• özet");
        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), &[report::build_request(&answers())]);
    }

    #[tokio::test]
    async fn failure_becomes_sentinel() {
        let stub = StubGenerator::new(Reply::Fail);
        assert_eq!(with(&stub).summarize(&answers()).await, SUMMARY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_or_blank_completion_becomes_sentinel() {
        for t in ["", "   \n"] {
            let stub = StubGenerator::new(Reply::Text(t));
            assert_eq!(with(&stub).summarize(&answers()).await, SUMMARY_UNAVAILABLE);
        }
    }

    #[tokio::test]
    async fn timeout_becomes_sentinel() {
        let stub = StubGenerator::new(Reply::Hang);
        assert_eq!(with(&stub).summarize(&answers()).await, SUMMARY_UNAVAILABLE);
    }

    fn google_key_in_env() -> bool {
        ["GOOGLE_API_KEY", "GOOGLE_GEMINI_API_KEY"]
            .iter()
            .any(|k| std::env::var(k).map(|v| !v.trim().is_empty()).unwrap_or(false))
    }

    #[test]
    fn gemini_without_key_is_fallback_only_when_env_is_unset() {
        if google_key_in_env() {
            return;
        }
        let s = Summarizer::from_config(&Config::default());
        assert!(!s.is_generative());
    }

    #[test]
    fn configured_api_key_selects_gemini() {
        if google_key_in_env() {
            return;
        }
        let mut c = Config::default();
        c.summarizer.api_key = Some("test-key".to_string());
        let s = Summarizer::from_config(&c);
        assert!(s.is_generative());
        assert_eq!(s.backend_name(), "gemini");
    }

    #[tokio::test]
    async fn blank_api_key_keeps_the_fallback() {
        if google_key_in_env() {
            return;
        }
        let mut c = Config::default();
        c.summarizer.api_key = Some("  ".to_string());
        let s = Summarizer::from_config(&c);
        assert!(!s.is_generative());
        assert_eq!(s.backend_name(), "fallback");
        assert!(s.summarize(&answers()).await.contains(ENABLE_SUMMARY_NOTE));
    }

    #[test]
    fn ollama_backend_needs_no_credential() {
        let mut c = Config::default();
        c.summarizer.backend = SummarizerBackend::Ollama;
        let s = Summarizer::from_config(&c);
        assert_eq!(s.backend_name(), "ollama");
    }
}
