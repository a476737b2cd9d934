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

use crate::connection::ConnectionState;

/// Aggregate view of one conversation across the life of the process.
#[derive(Debug, Clone)]
pub struct Session {
    /// Server-assigned conversation id, once known.
    pub conversation_id: Option<String>,
    pub connection_state: ConnectionState,
    /// Completed assistant turns this run.
    pub turn_count: u64,
    /// Accumulated cost in dollars, as reported by the server.
    pub total_cost: f64,
    /// Messages appended to history this run (user and assistant).
    pub message_count: u64,
    /// Model name from the latest message start, if the server sent one.
    pub last_model: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conversation_id: None,
            connection_state: ConnectionState::Disconnected,
            turn_count: 0,
            total_cost: 0.0,
            message_count: 0,
            last_model: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
