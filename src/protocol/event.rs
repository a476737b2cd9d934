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

//! Frame decoding and dialect normalization.
//!
//! This is the single place where the two wire dialects are reconciled;
//! everything downstream only ever sees [`InboundEvent`].

use crate::error::ChatError;
use crate::protocol::wire;
use serde_json::Value;

/// Maximum length for tool previews and detail strings shown to collaborators.
const PREVIEW_LIMIT: usize = 120;
const DETAIL_LIMIT: usize = 160;

/// One normalized inbound event, consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Server acknowledged a user message and assigned the conversation.
    UserAck { conversation_id: String },
    /// Incremental assistant text for the current turn.
    TextDelta { content: String },
    /// Incremental thinking text for the current turn.
    ThinkingDelta { content: String },
    /// Assistant turn opened (content-block dialect only).
    MessageStart { model: Option<String> },
    /// A tool invocation began.
    ToolStart { invocation_id: Option<String>, name: String, preview: String },
    /// A tool invocation finished.
    ToolResult { invocation_id: Option<String>, name: String, is_error: bool, detail: String },
    /// Terminal event for the current turn.
    ResultFinal {
        cost: f64,
        duration_ms: u64,
        turns: Option<u64>,
        final_text: Option<String>,
        thinking: Option<String>,
        is_error: bool,
        error: Option<String>,
    },
    /// Server-reported error, surfaced to the user without touching turn state.
    ErrorEvent { message: String },
    /// Informational server status (`connected`, `streaming`, `completed`).
    Status { status: String, message: String },
    /// Unrecognized frame type -- logged and otherwise ignored.
    Unknown { kind: String },
}

/// Decode one raw frame into a normalized event.
///
/// A parse failure is a local, non-fatal error: the caller logs it and drops
/// the frame. Unknown `type` values decode successfully to
/// [`InboundEvent::Unknown`] so new server frame types never halt processing.
pub fn decode_frame(raw: &str) -> Result<InboundEvent, ChatError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ChatError::Decode(format!("invalid json: {e}")))?;
    let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return Err(ChatError::Decode("frame has no `type` field".to_owned()));
    };

    let event = match kind.as_str() {
        "user_message_saved" => {
            let frame: wire::ConversationFrame = payload(value)?;
            InboundEvent::UserAck { conversation_id: frame.conversation_id }
        }
        "conversation_created" => {
            let frame: wire::ConversationFrame = payload(value)?;
            InboundEvent::UserAck { conversation_id: frame.conversation_id }
        }
        "text_chunk" => {
            let frame: wire::ContentFrame = payload(value)?;
            InboundEvent::TextDelta { content: frame.content }
        }
        "thinking" => {
            let frame: wire::ContentFrame = payload(value)?;
            InboundEvent::ThinkingDelta { content: frame.content }
        }
        "content_block_delta" => {
            let frame: wire::ContentBlockDeltaFrame = payload(value)?;
            InboundEvent::TextDelta { content: frame.delta.map(|d| d.text).unwrap_or_default() }
        }
        "message_start" => {
            let frame: wire::MessageStartFrame = payload(value)?;
            InboundEvent::MessageStart { model: frame.message.and_then(|m| m.model) }
        }
        "tool_start" => {
            let frame: wire::ToolStartFrame = payload(value)?;
            let name = frame.tool.unwrap_or_else(|| "tool".to_owned());
            let preview = frame
                .input
                .or(frame.action)
                .map(|v| truncate(&stringify(&v), PREVIEW_LIMIT))
                .unwrap_or_default();
            InboundEvent::ToolStart { invocation_id: frame.tool_use_id, name, preview }
        }
        "tool_result" => {
            let frame: wire::ToolResultFrame = payload(value)?;
            let name = frame.tool.unwrap_or_else(|| "tool".to_owned());
            let detail = frame
                .error
                .map(Value::String)
                .or(frame.content)
                .map(|v| truncate(&stringify(&v), DETAIL_LIMIT))
                .unwrap_or_default();
            InboundEvent::ToolResult {
                invocation_id: frame.tool_use_id,
                name,
                is_error: frame.is_error,
                detail,
            }
        }
        "result" => {
            let frame: wire::ResultFrame = payload(value)?;
            InboundEvent::ResultFinal {
                cost: frame.cost.unwrap_or(0.0),
                duration_ms: frame.duration_ms.unwrap_or(0),
                turns: frame.num_turns,
                final_text: frame.content,
                thinking: frame.thinking,
                is_error: frame.is_error,
                error: frame.error,
            }
        }
        "message_stop" => {
            let frame: wire::MessageStopFrame = payload(value)?;
            let usage = frame.usage.unwrap_or(wire::Usage {
                cost: None,
                duration_seconds: None,
                total_tokens: None,
            });
            InboundEvent::ResultFinal {
                cost: usage.cost.unwrap_or(0.0),
                duration_ms: duration_ms_from_seconds(usage.duration_seconds),
                turns: None,
                final_text: None,
                thinking: None,
                is_error: false,
                error: None,
            }
        }
        "error" => {
            let frame: wire::ErrorFrame = payload(value)?;
            InboundEvent::ErrorEvent { message: frame.message() }
        }
        "status" => {
            let frame: wire::StatusFrame = payload(value)?;
            InboundEvent::Status { status: frame.status, message: frame.message }
        }
        _ => InboundEvent::Unknown { kind },
    };
    Ok(event)
}

fn payload<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ChatError> {
    serde_json::from_value(value).map_err(|e| ChatError::Decode(e.to_string()))
}

fn duration_ms_from_seconds(seconds: Option<f64>) -> u64 {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => (s * 1000.0).round() as u64,
        _ => 0,
    }
}

/// Render a JSON value as human-readable preview text: bare strings stay bare,
/// everything else is pretty-printed.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Collapse whitespace and cap at `max` chars, with an ellipsis when trimmed.
fn truncate(text: &str, max: usize) -> String {
    let normalized: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max {
        return normalized;
    }
    let mut out: String = normalized.chars().take(max.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}
