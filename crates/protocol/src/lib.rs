use serde::{Deserialize, Serialize};

/// Protocol version (bumped when breaking changes are introduced)
pub const VERSION: u8 = 1;

/// Top-level message envelope exchanged between a chat transport and the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Message {
    ChatMessage(ChatMessage),
    Reply(Reply),
}

/// A line of text posted by someone in a chat channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub author_id: String,
    /// Name shown in replies and used as the ledger key
    pub display_name: String,
    pub channel_id: String,
    pub text: String,
}

/// Text the core wants posted back to a channel. One inbound message may
/// produce several of these (menu pages, progress notices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub channel_id: String,
    pub text: String,
}

impl Message {
    pub fn chat<S: Into<String>>(author_id: S, display_name: S, channel_id: S, text: S) -> Self {
        Message::ChatMessage(ChatMessage {
            v: Some(VERSION),
            author_id: author_id.into(),
            display_name: display_name.into(),
            channel_id: channel_id.into(),
            text: text.into(),
        })
    }

    pub fn reply<S: Into<String>>(channel_id: S, text: S) -> Self {
        Message::Reply(Reply { v: Some(VERSION), channel_id: channel_id.into(), text: text.into() })
    }
}

impl ChatMessage {
    pub fn new(
        author_id: impl Into<String>,
        display_name: impl Into<String>,
        channel_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            v: Some(VERSION),
            author_id: author_id.into(),
            display_name: display_name.into(),
            channel_id: channel_id.into(),
            text: text.into(),
        }
    }
}
