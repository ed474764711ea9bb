//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.weekly-report/config.json`) and environment.
//! Every field is optional; a missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings (health, Telegram webhook).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (e.g. Telegram).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Summarization backend settings.
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub telegram: TelegramChannelConfig,
}

/// Telegram channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChannelConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// When set, use webhook mode: Telegram POSTs updates to this URL.
    /// If unset, long-poll getUpdates is used.
    pub webhook_url: Option<String>,
    /// Optional secret for webhook verification (X-Telegram-Bot-Api-Secret-Token).
    pub webhook_secret: Option<String>,
}

/// Which text generation backend summarizes reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    /// Google Gemini; needs an API key, otherwise reports are rendered without a summary.
    #[default]
    Gemini,
    /// Local Ollama server; no credential.
    Ollama,
}

/// Summarizer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizerConfig {
    #[serde(default)]
    pub backend: SummarizerBackend,
    /// Gemini API key. Overridden by GOOGLE_API_KEY (or GOOGLE_GEMINI_API_KEY) env.
    pub api_key: Option<String>,
    /// Model name for the backend (default depends on backend).
    pub model: Option<String>,
    /// Override the backend base URL.
    pub base_url: Option<String>,
    /// Upper bound on one summarization call (default 30).
    pub timeout_secs: Option<u64>,
}

pub const DEFAULT_SUMMARIZER_TIMEOUT: Duration = Duration::from_secs(30);

/// Read an env var, treating unset, blank and whitespace-only values the same.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn config_non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the Telegram bot token: env TELEGRAM_BOT_TOKEN overrides config.
pub fn resolve_telegram_token(config: &Config) -> Option<String> {
    env_non_empty("TELEGRAM_BOT_TOKEN")
        .or_else(|| config_non_empty(config.channels.telegram.bot_token.as_ref()))
}

/// Resolve the Gemini API key: env GOOGLE_API_KEY, then GOOGLE_GEMINI_API_KEY, then config.
pub fn resolve_google_api_key(config: &Config) -> Option<String> {
    env_non_empty("GOOGLE_API_KEY")
        .or_else(|| env_non_empty("GOOGLE_GEMINI_API_KEY"))
        .or_else(|| config_non_empty(config.summarizer.api_key.as_ref()))
}

/// Summarization timeout; zero falls back to the default.
pub fn resolve_summarizer_timeout(config: &Config) -> Duration {
    config
        .summarizer
        .timeout_secs
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SUMMARIZER_TIMEOUT)
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("WEEKLY_REPORT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".weekly-report").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 15152);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn parses_camel_case_summarizer_section() {
        let c: Config = serde_json::from_str(
            r#"{"summarizer":{"backend":"ollama","model":"qwen3:8b","timeoutSecs":5}}"#,
        )
        .unwrap();
        assert_eq!(c.summarizer.backend, SummarizerBackend::Ollama);
        assert_eq!(c.summarizer.model.as_deref(), Some("qwen3:8b"));
        assert_eq!(resolve_summarizer_timeout(&c), Duration::from_secs(5));
    }

    #[test]
    fn empty_object_is_all_defaults() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.gateway.port, 15152);
        assert_eq!(c.summarizer.backend, SummarizerBackend::Gemini);
        assert!(c.channels.telegram.bot_token.is_none());
    }

    #[test]
    fn zero_timeout_uses_default() {
        let mut c = Config::default();
        c.summarizer.timeout_secs = Some(0);
        assert_eq!(resolve_summarizer_timeout(&c), DEFAULT_SUMMARIZER_TIMEOUT);
    }

    #[test]
    fn blank_config_values_are_ignored() {
        assert_eq!(config_non_empty(Some(&"   ".to_string())), None);
        assert_eq!(
            config_non_empty(Some(&" tok ".to_string())),
            Some("tok".to_string())
        );
    }

    fn google_key_in_env() -> bool {
        env_non_empty("GOOGLE_API_KEY").is_some()
            || env_non_empty("GOOGLE_GEMINI_API_KEY").is_some()
    }

    #[test]
    fn api_key_from_config_when_env_is_unset() {
        if google_key_in_env() {
            return;
        }
        let mut c = Config::default();
        c.summarizer.api_key = Some(" from-config ".to_string());
        assert_eq!(resolve_google_api_key(&c).as_deref(), Some("from-config"));
        c.summarizer.api_key = Some("   ".to_string());
        assert_eq!(resolve_google_api_key(&c), None);
    }

    #[test]
    fn loopback_binds() {
        assert!(is_loopback_bind("127.0.0.1"));
        assert!(is_loopback_bind(" localhost "));
        assert!(!is_loopback_bind("0.0.0.0"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let path = std::env::temp_dir().join("weekly-report-no-such-dir/config.json");
        let (c, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(c.gateway.bind, "127.0.0.1");
    }
}
