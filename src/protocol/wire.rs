// chat-client-rust — A native Rust client for a streaming GLM chat server
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Raw wire shapes for both server dialects.
//!
//! The server multiplexes two generations of frames over one socket: a simple
//! delta-text dialect (`text_chunk`, `result`, ...) and a content-block dialect
//! with nested usage statistics (`content_block_delta`, `message_stop`, ...).
//! Everything here is the literal JSON layout; normalization into one event set
//! happens in [`crate::protocol::event`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationFrame {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentFrame {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolStartFrame {
    #[serde(default, alias = "tool_name")]
    pub tool: Option<String>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    #[serde(default)]
    pub action: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolResultFrame {
    #[serde(default, alias = "tool_name")]
    pub tool: Option<String>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultFrame {
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub num_turns: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `error` frames carry the message under `error` (agent dialect) or
/// `content` (ZAI dialect). Accept both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorFrame {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ErrorFrame {
    #[must_use]
    pub fn message(self) -> String {
        self.error.or(self.content).unwrap_or_else(|| "unknown error".to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusFrame {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageStartFrame {
    #[serde(default)]
    pub message: Option<MessageInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageInfo {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlockDeltaFrame {
    #[serde(default)]
    pub delta: Option<Delta>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageStopFrame {
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

// ---------------------------------------------------------------------------
// Outbound commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    SendMessage {
        message: String,
        conversation_id: Option<String>,
        config: SendConfig,
    },
    NewConversation,
}

/// Send-time generation settings, forwarded verbatim to the server.
/// Field names are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub web_search_enabled: bool,
    pub multimodal_enabled: bool,
    pub roleplay_enabled: bool,
    pub roleplay: RoleplayConfig,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            model: "glm-4.6".to_owned(),
            temperature: 0.7,
            max_tokens: 2000,
            web_search_enabled: false,
            multimodal_enabled: false,
            roleplay_enabled: false,
            roleplay: RoleplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleplayConfig {
    #[serde(default)]
    pub bot_name: String,
    #[serde(default)]
    pub bot_info: String,
    #[serde(default)]
    pub user_name: String,
}
