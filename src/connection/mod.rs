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

pub mod backoff;
pub mod manager;

pub use backoff::{MAX_RETRIES, reconnect_delay};
pub use manager::{
    CloseOutcome, ConnectionManager, ConnectionState, LinkCommand, LinkEvent, connection_task,
};
