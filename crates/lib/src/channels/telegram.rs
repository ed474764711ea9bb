//! Telegram channel: long-poll getUpdates and sendMessage via Bot API.

use crate::channels::inbound::{InboundMessage, Keyboard, OutboundMessage};
use crate::channels::registry::ChannelHandle;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const LONG_POLL_TIMEOUT: u64 = 30;

pub const TELEGRAM_CHANNEL_ID: &str = "telegram";

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<TelegramUpdate>,
}

/// Telegram update payload (getUpdates result item or webhook POST body).
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

impl TelegramUpdate {
    /// Text messages become inbound messages; stickers, photos, edits etc. are skipped.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let msg = self.message?;
        let text = msg.text.filter(|t| !t.trim().is_empty())?;
        Some(InboundMessage {
            channel_id: TELEGRAM_CHANNEL_ID.to_string(),
            conversation_id: msg.chat.id.to_string(),
            text,
        })
    }
}

/// `reply_markup` for sendMessage, or None to leave the keyboard alone.
fn reply_markup(keyboard: Keyboard) -> Option<serde_json::Value> {
    match keyboard {
        Keyboard::Keep => None,
        Keyboard::StartButton => Some(serde_json::json!({
            "keyboard": [["/start"]],
            "resize_keyboard": true
        })),
        Keyboard::Remove => Some(serde_json::json!({ "remove_keyboard": true })),
    }
}

/// Telegram channel connector: long-polls for updates and sends replies via sendMessage.
pub struct TelegramChannel {
    id: String,
    token: Option<String>,
    api_base: String,
    running: AtomicBool,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(token: Option<String>) -> Self {
        Self {
            id: TELEGRAM_CHANNEL_ID.to_string(),
            token,
            api_base: telegram_api_base(),
            running: AtomicBool::new(false),
            client: reqwest::Client::new(),
        }
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn method_url(&self, method: &str) -> Result<String, String> {
        let token = self
            .token
            .as_ref()
            .ok_or("telegram bot token not configured")?;
        Ok(format!("{}/bot{}/{}", self.api_base, token, method))
    }

    /// Start the getUpdates long-poll loop and forward messages to the gateway.
    /// Returns a handle to await on shutdown.
    pub fn start_inbound(
        self: Arc<Self>,
        inbound_tx: mpsc::Sender<InboundMessage>,
    ) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        log::info!("telegram channel: starting getUpdates long-poll loop");
        tokio::spawn(async move {
            run_get_updates_loop(self, inbound_tx).await;
        })
    }

    /// Call Telegram getUpdates (long poll). Returns (updates, next_offset).
    async fn get_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<(Vec<TelegramUpdate>, Option<i64>), String> {
        let url = format!(
            "{}?timeout={}",
            self.method_url("getUpdates")?,
            LONG_POLL_TIMEOUT
        );
        let url = if let Some(off) = offset {
            format!("{}&offset={}", url, off)
        } else {
            url
        };
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("getUpdates failed: {} {}", status, body));
        }
        let data: GetUpdatesResponse = res.json().await.map_err(|e| e.to_string())?;
        if !data.ok {
            return Err("getUpdates returned ok: false".to_string());
        }
        let next_offset = data
            .result
            .iter()
            .map(|u| u.update_id)
            .max()
            .map(|id| id + 1);
        Ok((data.result, next_offset))
    }

    /// Set webhook URL (and optional secret). Telegram then POSTs updates to the URL.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), String> {
        let api_url = self.method_url("setWebhook")?;
        let mut body = serde_json::json!({ "url": url });
        if let Some(s) = secret {
            body["secret_token"] = serde_json::Value::String(s.to_string());
        }
        self.post("setWebhook", &api_url, Some(&body)).await
    }

    /// Remove webhook so the bot can use getUpdates again.
    pub async fn delete_webhook(&self) -> Result<(), String> {
        let url = self.method_url("deleteWebhook")?;
        self.post("deleteWebhook", &url, None).await
    }

    /// Send a text message to a chat via sendMessage API.
    pub async fn send_message(
        &self,
        chat_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), String> {
        let url = self.method_url("sendMessage")?;
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": message.text });
        if let Some(markup) = reply_markup(message.keyboard) {
            body["reply_markup"] = markup;
        }
        self.post("sendMessage", &url, Some(&body)).await
    }

    async fn post(
        &self,
        method: &str,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        let req = self.client.post(url);
        let req = match body {
            Some(b) => req.json(b),
            None => req,
        };
        let res = req.send().await.map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("{} failed: {} {}", method, status, body));
        }
        Ok(())
    }
}

async fn run_get_updates_loop(
    channel: Arc<TelegramChannel>,
    inbound_tx: mpsc::Sender<InboundMessage>,
) {
    let mut offset: Option<i64> = None;
    while channel.running() {
        match channel.get_updates(offset).await {
            Ok((updates, next)) => {
                if next.is_some() {
                    offset = next;
                }
                for inbound in updates.into_iter().filter_map(TelegramUpdate::into_inbound) {
                    if inbound_tx.send(inbound).await.is_err() {
                        log::debug!("telegram: inbound channel closed, stopping loop");
                        return;
                    }
                }
            }
            Err(e) => {
                log::debug!("telegram getUpdates error: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
            }
        }
    }
    log::info!("telegram channel: getUpdates loop stopped");
}

#[async_trait]
impl ChannelHandle for TelegramChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), String> {
        TelegramChannel::send_message(self, conversation_id, message).await
    }
}

/// Resolve Telegram bot API base URL (for tests or custom endpoints).
pub fn telegram_api_base() -> String {
    std::env::var("TELEGRAM_API_BASE")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| TELEGRAM_API_BASE.to_string())
}
