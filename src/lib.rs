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

pub mod connection;
pub mod error;
pub mod protocol;
pub mod session;
pub mod storage;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chat-rs", about = "Native Rust client for a streaming GLM chat server")]
pub struct Cli {
    /// WebSocket endpoint of the chat server
    #[arg(long, default_value = "ws://localhost:8080/ws/chat")]
    pub url: String,

    /// Start a fresh conversation, discarding persisted history
    #[arg(long)]
    pub new: bool,

    /// Override the history snapshot location
    #[arg(long)]
    pub history_file: Option<std::path::PathBuf>,

    /// Write diagnostics to this file (tracing is off without it)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,

    /// Tracing filter directives, e.g. `chat_client_rust=debug`
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,
}
