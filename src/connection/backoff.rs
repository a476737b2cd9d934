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

//! Reconnect backoff policy.

use std::time::Duration;

/// Automatic recovery gives up after this many consecutive failed attempts.
pub const MAX_RETRIES: u32 = 6;

const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 15_000;

/// Delay before reconnect attempt `attempt` (0-based): exponential from 1s,
/// capped at 15s. The cap keeps recovery latency low after transient blips
/// without producing retry storms.
#[must_use]
pub fn reconnect_delay(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
}
