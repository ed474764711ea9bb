//! Gateway HTTP server: health probe and Telegram webhook, plus the inbound dispatcher task.

use crate::bot::ReportBot;
use crate::channels::{
    ChannelHandle, ChannelRegistry, InboundMessage, TelegramChannel, TelegramUpdate,
};
use crate::config::{self, Config};
use crate::gateway::dispatch::process_inbound_message;
use crate::summarize::Summarizer;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shared state for the gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub bot: ReportBot,
    /// In-process channel connector tasks; awaited during graceful shutdown.
    pub channel_tasks: Arc<tokio::sync::RwLock<Vec<JoinHandle<()>>>>,
    /// Sender for inbound channel messages (e.g. Telegram webhook POSTs). Dispatcher task receives.
    pub inbound_tx: mpsc::Sender<InboundMessage>,
    pub channel_registry: Arc<ChannelRegistry>,
}

/// Run the gateway with the summarizer described by `config`.
pub async fn run_gateway(config: Config) -> Result<()> {
    let summarizer = Summarizer::from_config(&config);
    run_gateway_with(config, summarizer).await
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// When bind is not loopback, a webhook secret must be configured or startup fails.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway_with(config: Config, summarizer: Summarizer) -> Result<()> {
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) && config.channels.telegram.webhook_secret.is_none() {
        anyhow::bail!(
            "refusing to bind gateway to {} without channels.telegram.webhookSecret",
            bind
        );
    }

    let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundMessage>(64);
    let channel_tasks = Arc::new(tokio::sync::RwLock::new(Vec::new()));
    let state = GatewayState {
        config: Arc::new(config.clone()),
        bot: ReportBot::new(summarizer),
        channel_tasks: channel_tasks.clone(),
        inbound_tx: inbound_tx.clone(),
        channel_registry: Arc::new(ChannelRegistry::new()),
    };

    {
        let bot = state.bot.clone();
        let registry = state.channel_registry.clone();
        tokio::spawn(async move {
            while let Some(msg) = inbound_rx.recv().await {
                process_inbound_message(&bot, &registry, msg).await;
            }
        });
    }

    let telegram_token = config::resolve_telegram_token(&config);
    let webhook_url = config.channels.telegram.webhook_url.clone();
    let telegram_webhook_for_shutdown: Option<Arc<TelegramChannel>> =
        if let Some(token) = telegram_token {
            let telegram = Arc::new(TelegramChannel::new(Some(token)));
            if let Some(ref url) = webhook_url {
                let secret = config.channels.telegram.webhook_secret.as_deref();
                if let Err(e) = telegram.set_webhook(url, secret).await {
                    log::warn!("telegram set_webhook failed: {}", e);
                } else {
                    log::info!("telegram channel registered (webhook mode): {}", url);
                }
                state
                    .channel_registry
                    .register(telegram.id().to_string(), telegram.clone())
                    .await;
                Some(telegram)
            } else {
                let handle = telegram.clone().start_inbound(inbound_tx);
                state.channel_tasks.write().await.push(handle);
                state
                    .channel_registry
                    .register(telegram.id().to_string(), telegram)
                    .await;
                log::info!("telegram channel registered and getUpdates loop started");
                None
            }
        } else {
            log::warn!("TELEGRAM_BOT_TOKEN is not set; no chat channel is running");
            None
        };

    let channel_registry = state.channel_registry.clone();
    let app = Router::new()
        .route("/", get(health_http))
        .route("/telegram/webhook", post(telegram_webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(
            channel_registry,
            channel_tasks,
            telegram_webhook_for_shutdown,
        ))
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// Stops channel connectors, removes the Telegram webhook if used, then awaits channel tasks.
async fn shutdown_signal(
    channel_registry: Arc<ChannelRegistry>,
    channel_tasks: Arc<tokio::sync::RwLock<Vec<JoinHandle<()>>>>,
    telegram_webhook: Option<Arc<TelegramChannel>>,
) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, stopping channels");

    for id in channel_registry.ids().await {
        if let Some(handle) = channel_registry.get(&id).await {
            handle.stop();
        }
    }

    if let Some(t) = telegram_webhook {
        if let Err(e) = t.delete_webhook().await {
            log::debug!("telegram delete_webhook on shutdown: {}", e);
        }
    }

    let handles = {
        let mut g = channel_tasks.write().await;
        std::mem::take(&mut *g)
    };
    for h in handles {
        let _ = h.await;
    }
    log::info!("channel tasks finished");
}

/// POST /telegram/webhook: checks the optional secret header and queues the update.
async fn telegram_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(ref expected) = state.config.channels.telegram.webhook_secret {
        let provided = headers
            .get("X-Telegram-Bot-Api-Secret-Token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected.as_str() {
            return StatusCode::FORBIDDEN;
        }
    }
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(_) => return StatusCode::BAD_REQUEST,
    };
    let Some(inbound) = update.into_inbound() else {
        return StatusCode::OK;
    };
    if state.inbound_tx.send(inbound).await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "activeSessions": state.bot.store().active_count().await,
        "summarizer": state.bot.summarizer().backend_name(),
    }))
}
