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

//! Lifecycle tracking for concurrently running tool invocations.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Running,
    Done,
    Error,
}

/// How long collaborators should keep a finished invocation visible before
/// calling [`ToolTracker::remove`]. Errors linger longer so the user can
/// actually read them. The tracker itself owns no timers.
#[must_use]
pub fn removal_grace(status: ToolStatus) -> Duration {
    match status {
        ToolStatus::Error => Duration::from_millis(6000),
        _ => Duration::from_millis(3000),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub status: ToolStatus,
    pub detail: String,
    pub started_at: Instant,
}

/// In-flight tool invocations keyed by id. Per-id transitions follow
/// `begin -> complete -> remove`; there is no ordering constraint across ids.
#[derive(Debug, Default)]
pub struct ToolTracker {
    invocations: HashMap<String, ToolInvocation>,
}

impl ToolTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a running invocation. A duplicate id overwrites the previous
    /// entry (idempotent restart).
    pub fn begin(&mut self, id: impl Into<String>, name: impl Into<String>, preview: impl Into<String>) {
        let id = id.into();
        self.invocations.insert(
            id.clone(),
            ToolInvocation {
                id,
                name: name.into(),
                status: ToolStatus::Running,
                detail: preview.into(),
                started_at: Instant::now(),
            },
        );
    }

    /// Mark an invocation finished. A result with no matching start is
    /// tolerated: a short-lived entry is synthesized so collaborators still
    /// get a terminal signal.
    pub fn complete(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        success: bool,
        detail: impl Into<String>,
    ) -> ToolStatus {
        let id = id.into();
        let status = if success { ToolStatus::Done } else { ToolStatus::Error };
        let detail = detail.into();
        match self.invocations.get_mut(&id) {
            Some(invocation) => {
                invocation.status = status;
                invocation.detail = detail;
            }
            None => {
                tracing::debug!("tool result for unknown invocation {id}; synthesizing entry");
                self.invocations.insert(
                    id.clone(),
                    ToolInvocation {
                        id,
                        name: name.into(),
                        status,
                        detail,
                        started_at: Instant::now(),
                    },
                );
            }
        }
        status
    }

    /// Drop an invocation after the collaborator's display grace period.
    pub fn remove(&mut self, id: &str) {
        self.invocations.remove(id);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ToolInvocation> {
        self.invocations.get(id)
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.invocations.values().filter(|i| i.status == ToolStatus::Running).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.invocations.values()
    }
}
