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

//! Durable storage for the conversation snapshot.
//!
//! One well-known key holds the whole `{conversationId, messages}` payload.
//! The store is deliberately dumb string storage; snapshot encoding and the
//! defensive decode live in [`crate::session::history`].

use crate::error::ChatError;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub trait SnapshotStore {
    /// Read the snapshot payload; `None` when the key is absent.
    fn load(&self) -> Result<Option<String>, ChatError>;
    /// Write the snapshot payload, replacing any previous value.
    fn save(&self, payload: &str) -> Result<(), ChatError>;
    /// Remove the key entirely. Removing an absent key is not an error.
    fn remove(&self) -> Result<(), ChatError>;
}

/// Filesystem-backed store: one JSON file under the platform data dir.
pub struct FsSnapshotStore {
    path: PathBuf,
}

impl FsSnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default snapshot location: `<data_dir>/chat-rs/history.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("chat-rs").join("history.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self) -> Result<Option<String>, ChatError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChatError::Storage(format!("read {}: {e}", self.path.display()))),
        }
    }

    fn save(&self, payload: &str) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChatError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        std::fs::write(&self.path, payload)
            .map_err(|e| ChatError::Storage(format!("write {}: {e}", self.path.display())))
    }

    fn remove(&self) -> Result<(), ChatError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChatError::Storage(format!("remove {}: {e}", self.path.display()))),
        }
    }
}

/// In-memory store, used when no data dir is available and by tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    payload: RefCell<Option<String>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<String>, ChatError> {
        Ok(self.payload.borrow().clone())
    }

    fn save(&self, payload: &str) -> Result<(), ChatError> {
        *self.payload.borrow_mut() = Some(payload.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), ChatError> {
        *self.payload.borrow_mut() = None;
        Ok(())
    }
}
