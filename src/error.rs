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

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("not connected to the chat server")]
    NotConnected,
    #[error("failed to decode inbound frame: {0}")]
    Decode(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("durable storage failure: {0}")]
    Storage(String),
    #[error("tool {name} failed: {detail}")]
    ToolFailure { name: String, detail: String },
}

impl ChatError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConnected => {
                "Not connected to the chat server. Your message was not sent -- \
                 wait for the reconnect or run /reconnect."
                    .to_owned()
            }
            Self::Decode(detail) => format!("The server sent a frame we could not read: {detail}"),
            Self::Transport(detail) => format!("Connection trouble: {detail}"),
            Self::Storage(detail) => {
                format!("Could not read or write the saved conversation: {detail}")
            }
            Self::ToolFailure { name, detail } => format!("Tool {name} failed: {detail}"),
        }
    }
}
