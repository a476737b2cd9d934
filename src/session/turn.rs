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

//! Streaming reconstruction of the assistant message currently in flight.

use crate::session::history::{HistoryEntry, Role};

/// The assistant message being streamed right now. At most one exists per
/// session; it lives from the first delta (or turn-open signal) until the
/// terminal event finalizes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTurn {
    /// Append-only until finalized.
    pub main_text: String,
    /// Accumulated independently; never mixed into `main_text`.
    pub thinking_text: String,
    pub chunk_count: u32,
}

/// Owns the single optional [`PendingTurn`].
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    turn: Option<PendingTurn>,
}

impl TurnAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&PendingTurn> {
        self.turn.as_ref()
    }

    /// Make sure a turn exists without adding content. An empty delta is a
    /// legitimate "turn started, nothing streamed yet" signal.
    pub fn ensure_started(&mut self) -> &mut PendingTurn {
        self.turn.get_or_insert_with(PendingTurn::default)
    }

    pub fn append_main(&mut self, text: &str) {
        let turn = self.ensure_started();
        turn.main_text.push_str(text);
        turn.chunk_count += 1;
    }

    pub fn append_thinking(&mut self, text: &str) {
        let turn = self.ensure_started();
        turn.thinking_text.push_str(text);
        turn.chunk_count += 1;
    }

    /// Resolve the turn into one immutable history entry and reset.
    ///
    /// Total by design: a terminal event may arrive before any delta
    /// (zero-length responses), in which case this still yields an
    /// empty-content assistant entry. `final_text` from the terminal event
    /// wins over the accumulated stream; `thinking` likewise.
    pub fn finalize(
        &mut self,
        final_text: Option<String>,
        thinking: Option<String>,
    ) -> HistoryEntry {
        let turn = self.turn.take().unwrap_or_default();
        let content = final_text.unwrap_or(turn.main_text);
        let thinking = thinking
            .or_else(|| (!turn.thinking_text.is_empty()).then_some(turn.thinking_text));
        HistoryEntry::new(Role::Assistant, content).thinking(thinking)
    }
}
