//! Discord transport: gateway WebSocket for inbound messages, REST for replies.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use orchestrator_core::ports::OutboundPort;
use protocol::ChatMessage;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const API_BASE: &str = "https://discord.com/api/v10";

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
pub const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

const MAX_RECONNECT_ATTEMPTS: u32 = 8;
const INITIAL_RETRY_DELAY_MS: u64 = 1_000;
const MAX_RETRY_DELAY_MS: u64 = 60_000;
const DEFAULT_HEARTBEAT_MS: u64 = 41_250;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway rejected the session (close code {code}): {reason}")]
    Fatal { code: u16, reason: String },

    #[error("gateway closed (code {code}): {reason}")]
    Closed { code: u16, reason: String },

    #[error("gateway protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Fatal { .. })
    }
}

/// What the gateway hands to the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// The bot's own user id, announced in READY.
    Ready { self_id: String },
    Chat(ChatMessage),
}

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    d: Option<Value>,
    s: Option<u64>,
    t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Author {
    id: String,
    username: String,
    global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Member {
    nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageCreate {
    channel_id: String,
    author: Author,
    #[serde(default)]
    content: String,
    member: Option<Member>,
}

/// 4004 (bad token) and 4014 (disallowed intents) need a config change.
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4014)
}

/// Exponential backoff capped at one minute.
pub fn reconnect_delay(attempt: u32) -> Duration {
    let ms = INITIAL_RETRY_DELAY_MS.saturating_mul(2u64.pow(attempt.min(12)));
    Duration::from_millis(ms.min(MAX_RETRY_DELAY_MS))
}

pub fn identify_payload(token: &str) -> Value {
    json!({
        "op": 2,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "lunchbot",
                "device": "lunchbot"
            }
        }
    })
}

/// Converts a MESSAGE_CREATE body. The display name prefers the guild
/// nickname, then the global name, then the username.
pub fn chat_from_event(d: Value) -> Option<ChatMessage> {
    let msg: MessageCreate = serde_json::from_value(d).ok()?;
    let display_name = msg
        .member
        .and_then(|m| m.nick)
        .or(msg.author.global_name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(msg.author.username);
    Some(ChatMessage::new(msg.author.id, display_name, msg.channel_id, msg.content))
}

pub struct DiscordGateway {
    token: String,
    url: String,
}

impl DiscordGateway {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), url: GATEWAY_URL.to_string() }
    }

    /// Runs until `events` is closed or a fatal close code arrives,
    /// reconnecting with backoff in between.
    pub async fn run(&self, events: mpsc::Sender<GatewayEvent>) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            match self.run_session(&events).await {
                Ok(()) if events.is_closed() => return Ok(()),
                Ok(()) => {
                    info!("gateway session ended, reconnecting");
                    attempt = 0;
                }
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "gateway stopped");
                    return Err(e).context("Discord gateway rejected the bot");
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > MAX_RECONNECT_ATTEMPTS {
                        return Err(e).context("Discord gateway: giving up after repeated failures");
                    }
                    let delay = reconnect_delay(attempt - 1);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "gateway error, reconnecting");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn run_session(&self, events: &mpsc::Sender<GatewayEvent>) -> Result<(), GatewayError> {
        let (ws, _) = connect_async(self.url.as_str()).await?;
        let (write, mut read) = ws.split();

        let hello = read
            .next()
            .await
            .ok_or_else(|| GatewayError::Protocol("closed before Hello".to_string()))??;
        let hello: GatewayPayload = serde_json::from_str(hello.to_text()?)?;
        if hello.op != 10 {
            return Err(GatewayError::Protocol(format!("expected Hello (op 10), got op {}", hello.op)));
        }
        let interval = hello
            .d
            .as_ref()
            .and_then(|d| d["heartbeat_interval"].as_u64())
            .unwrap_or(DEFAULT_HEARTBEAT_MS);
        info!(heartbeat_ms = interval, "connected to gateway");

        let write = Arc::new(Mutex::new(write));
        write.lock().await.send(WsMessage::Text(identify_payload(&self.token).to_string())).await?;

        let (seq_tx, seq_rx) = watch::channel::<Option<u64>>(None);
        let heartbeat = tokio::spawn({
            let write = write.clone();
            async move {
                let mut ticker = tokio::time::interval(Duration::from_millis(interval));
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let beat = json!({ "op": 1, "d": *seq_rx.borrow() });
                    if let Err(e) = write.lock().await.send(WsMessage::Text(beat.to_string())).await {
                        warn!(error = %e, "heartbeat send failed");
                        break;
                    }
                }
            }
        });

        let outcome = self.read_loop(&mut read, events, &seq_tx).await;
        heartbeat.abort();
        outcome
    }

    async fn read_loop<S>(
        &self,
        read: &mut S,
        events: &mpsc::Sender<GatewayEvent>,
        seq: &watch::Sender<Option<u64>>,
    ) -> Result<(), GatewayError>
    where
        S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        while let Some(frame) = read.next().await {
            let text = match frame? {
                WsMessage::Text(t) => t,
                WsMessage::Close(frame) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.to_string()))
                        .unwrap_or((0, String::new()));
                    if is_fatal_close(code) {
                        return Err(GatewayError::Fatal { code, reason });
                    }
                    if code == 1000 || code == 0 {
                        return Ok(());
                    }
                    return Err(GatewayError::Closed { code, reason });
                }
                _ => continue,
            };

            let payload: GatewayPayload = match serde_json::from_str(&text) {
                Ok(p) => p,
                Err(e) => {
                    debug!(error = %e, "skipping undecodable gateway frame");
                    continue;
                }
            };
            if let Some(s) = payload.s {
                seq.send_replace(Some(s));
            }

            let event = match (payload.op, payload.t.as_deref(), payload.d) {
                (0, Some("READY"), Some(d)) => d["user"]["id"].as_str().map(|id| {
                    info!(user = d["user"]["username"].as_str().unwrap_or(""), id, "gateway ready");
                    GatewayEvent::Ready { self_id: id.to_string() }
                }),
                (0, Some("MESSAGE_CREATE"), Some(d)) => chat_from_event(d).map(GatewayEvent::Chat),
                (7, _, _) => {
                    info!("gateway requested reconnect");
                    return Ok(());
                }
                (9, _, _) => return Err(GatewayError::Protocol("invalid session".to_string())),
                _ => None,
            };

            if let Some(event) = event {
                if events.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }
        Err(GatewayError::Protocol("stream ended".to_string()))
    }
}

/// Sends replies through the REST API.
#[derive(Clone)]
pub struct DiscordOutbound {
    http: Client,
    token: String,
    api_base: String,
}

impl DiscordOutbound {
    pub fn new(http: Client, token: impl Into<String>) -> Self {
        Self { http, token: token.into(), api_base: API_BASE.to_string() }
    }

    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "content": content }))
            .send()
            .await
            .context("Failed to send Discord message")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(channel_id, %status, "sendMessage failed");
            anyhow::bail!("Discord returned {}: {}", status, body);
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundPort for DiscordOutbound {
    async fn send(&self, msg: protocol::Message) -> Result<()> {
        match msg {
            protocol::Message::Reply(reply) => self.send_message(&reply.channel_id, &reply.text).await,
            protocol::Message::ChatMessage(_) => Ok(()),
        }
    }
}
