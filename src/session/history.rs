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

//! Bounded, persisted log of finalized messages.

use crate::error::ChatError;
use crate::storage::SnapshotStore;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Retention cap: oldest entries are discarded once the log grows past this.
pub const MAX_HISTORY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A finalized, immutable conversation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), timestamp: now_timestamp(), thinking: None }
    }

    #[must_use]
    pub fn thinking<T: Into<String>>(mut self, thinking: Option<T>) -> Self {
        self.thinking = thinking.map(Into::into);
        self
    }
}

/// Seconds-since-epoch as a string. The original UI stored ISO strings; the
/// format is opaque to this layer, it only has to round-trip.
fn now_timestamp() -> String {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0).to_string()
}

/// The whole durable payload under the well-known key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<String>,
    pub messages: Vec<HistoryEntry>,
}

#[derive(Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one finalized entry, trimming the oldest entries past the cap.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            let overflow = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..overflow);
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole snapshot to durable storage. An empty log removes the
    /// key instead of writing an empty payload.
    pub fn persist(
        &self,
        store: &dyn SnapshotStore,
        conversation_id: Option<&str>,
    ) -> Result<(), ChatError> {
        if self.entries.is_empty() {
            return store.remove();
        }
        let snapshot = HistorySnapshot {
            conversation_id: conversation_id.map(str::to_owned),
            messages: self.entries.clone(),
        };
        let payload = serde_json::to_string(&snapshot)
            .map_err(|e| ChatError::Storage(format!("encode snapshot: {e}")))?;
        store.save(&payload)
    }

    /// Load the snapshot at session start. Absent, malformed, or structurally
    /// wrong payloads degrade to `None` -- corruption never crashes startup.
    /// On success the log is replaced (capped) and the stored conversation id
    /// is returned for the session to readopt.
    pub fn restore(&mut self, store: &dyn SnapshotStore) -> Option<Option<String>> {
        let payload = match store.load() {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read history snapshot: {e}");
                return None;
            }
        };
        let snapshot: HistorySnapshot = match serde_json::from_str(&payload) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("discarding malformed history snapshot: {e}");
                return None;
            }
        };
        self.entries = snapshot.messages;
        if self.entries.len() > MAX_HISTORY {
            let overflow = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..overflow);
        }
        Some(snapshot.conversation_id)
    }

    /// Empty the log and remove the durable key ("start new chat").
    pub fn clear(&mut self, store: &dyn SnapshotStore) -> Result<(), ChatError> {
        self.entries.clear();
        store.remove()
    }
}
