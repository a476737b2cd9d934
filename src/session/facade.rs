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

//! The session facade: single entry point wiring the link, the protocol,
//! the turn accumulator, the tool tracker, and persisted history together.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connection::{ConnectionState, LinkCommand, LinkEvent};
use crate::error::ChatError;
use crate::protocol::{ClientCommand, InboundEvent, SendConfig};
use crate::session::history::{HistoryEntry, HistoryStore, Role};
use crate::session::state::Session;
use crate::session::tools::{ToolStatus, ToolTracker, removal_grace};
use crate::session::turn::TurnAccumulator;
use crate::storage::SnapshotStore;

/// User-facing notifications produced by the dispatcher. The driver decides
/// how to render them; the facade never prints.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    ConnectionChanged(ConnectionState),
    /// Link came back after a drop.
    Reconnected,
    RetryScheduled { attempt: u32, delay: Duration },
    /// Automatic recovery gave up; a manual reconnect is required.
    RetriesExhausted,
    ConversationAssigned(String),
    TextDelta(String),
    ThinkingDelta(String),
    TurnCompleted { entry: HistoryEntry, cost: f64, duration_ms: u64, is_error: bool },
    ToolStarted { id: String, name: String, preview: String },
    /// Tool finished; the entry stays visible for `remove_after`, then the
    /// driver should call [`ChatSession::expire_tool`].
    ToolFinished { id: String, name: String, status: ToolStatus, detail: String, remove_after: Duration },
    SystemNotice(String),
    ErrorNotice(String),
}

/// One conversation over one link.
///
/// All mutation funnels through [`ChatSession::handle_link_event`], so the
/// dispatch rules can be tested by feeding events directly, no socket needed.
pub struct ChatSession {
    session: Session,
    turn: TurnAccumulator,
    tools: ToolTracker,
    history: HistoryStore,
    store: Box<dyn SnapshotStore>,
    command_tx: mpsc::UnboundedSender<LinkCommand>,
    config: SendConfig,
}

impl ChatSession {
    #[must_use]
    pub fn new(
        store: Box<dyn SnapshotStore>,
        command_tx: mpsc::UnboundedSender<LinkCommand>,
    ) -> Self {
        Self {
            session: Session::new(),
            turn: TurnAccumulator::new(),
            tools: ToolTracker::new(),
            history: HistoryStore::new(),
            store,
            command_tx,
            config: SendConfig::default(),
        }
    }

    /// Load any persisted history and readopt its conversation id. Returns
    /// how many messages came back.
    pub fn restore_history(&mut self) -> usize {
        if let Some(conversation_id) = self.history.restore(self.store.as_ref()) {
            self.session.conversation_id = conversation_id;
        }
        self.history.len()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    #[must_use]
    pub fn tools(&self) -> &ToolTracker {
        &self.tools
    }

    pub fn config_mut(&mut self) -> &mut SendConfig {
        &mut self.config
    }

    /// Send one user message on the current conversation.
    ///
    /// Rejected while the link is down; the caller keeps the text and can
    /// retry after reconnecting, nothing is silently dropped.
    pub fn send_message(&mut self, text: &str) -> Result<(), ChatError> {
        if self.session.connection_state != ConnectionState::Connected {
            return Err(ChatError::NotConnected);
        }
        let frame = ClientCommand::SendMessage {
            message: text.to_owned(),
            conversation_id: self.session.conversation_id.clone(),
            config: self.config.clone(),
        };
        self.command_tx
            .send(LinkCommand::Send(frame))
            .map_err(|_| ChatError::Transport("link task is gone".to_owned()))?;

        self.history.append(HistoryEntry::new(Role::User, text));
        self.session.message_count += 1;
        self.persist();
        Ok(())
    }

    /// Discard the conversation locally and, when connected, tell the server
    /// to open a fresh one.
    pub fn new_conversation(&mut self) -> Result<(), ChatError> {
        self.history.clear(self.store.as_ref())?;
        self.session.conversation_id = None;
        self.session.turn_count = 0;
        self.session.total_cost = 0.0;
        self.session.message_count = 0;
        self.turn = TurnAccumulator::new();
        self.tools = ToolTracker::new();
        if self.session.connection_state == ConnectionState::Connected {
            self.command_tx
                .send(LinkCommand::Send(ClientCommand::NewConversation))
                .map_err(|_| ChatError::Transport("link task is gone".to_owned()))?;
        }
        Ok(())
    }

    /// Ask the link task to drop the socket and dial again now.
    pub fn reconnect(&self) -> Result<(), ChatError> {
        self.command_tx
            .send(LinkCommand::Reconnect)
            .map_err(|_| ChatError::Transport("link task is gone".to_owned()))
    }

    /// Drop a finished tool entry once its display grace period has passed.
    pub fn expire_tool(&mut self, id: &str) {
        self.tools.remove(id);
    }

    /// Feed one event from the link task through the dispatcher.
    pub fn handle_link_event(&mut self, event: LinkEvent) -> Vec<SessionNotice> {
        match event {
            LinkEvent::StateChanged(state) => {
                self.session.connection_state = state;
                vec![SessionNotice::ConnectionChanged(state)]
            }
            LinkEvent::Connected { recovered } => {
                if recovered {
                    vec![SessionNotice::Reconnected]
                } else {
                    Vec::new()
                }
            }
            LinkEvent::RetryScheduled { attempt, delay } => {
                vec![SessionNotice::RetryScheduled { attempt, delay }]
            }
            LinkEvent::SendRejected(frame) => match frame {
                ClientCommand::SendMessage { message, .. } => {
                    vec![SessionNotice::ErrorNotice(format!(
                        "not delivered while the link is down, send it again: {message}"
                    ))]
                }
                ClientCommand::NewConversation => Vec::new(),
            },
            LinkEvent::GaveUp => vec![SessionNotice::RetriesExhausted],
            LinkEvent::Frame(inbound) => self.dispatch(inbound),
        }
    }

    /// Apply one inbound protocol event to session state.
    fn dispatch(&mut self, event: InboundEvent) -> Vec<SessionNotice> {
        match event {
            InboundEvent::UserAck { conversation_id } => {
                let changed = self.session.conversation_id.as_deref() != Some(&conversation_id);
                self.session.conversation_id = Some(conversation_id.clone());
                if changed {
                    self.persist();
                    vec![SessionNotice::ConversationAssigned(conversation_id)]
                } else {
                    Vec::new()
                }
            }
            InboundEvent::TextDelta { content } => {
                self.turn.append_main(&content);
                vec![SessionNotice::TextDelta(content)]
            }
            InboundEvent::ThinkingDelta { content } => {
                self.turn.append_thinking(&content);
                vec![SessionNotice::ThinkingDelta(content)]
            }
            InboundEvent::MessageStart { model } => {
                if model.is_some() {
                    self.session.last_model = model;
                }
                self.turn.ensure_started();
                Vec::new()
            }
            InboundEvent::ToolStart { invocation_id, name, preview } => {
                // Older servers omit the invocation id; mint one so the
                // start/result pair can still be tracked.
                let id = invocation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                self.tools.begin(&id, &name, &preview);
                vec![SessionNotice::ToolStarted { id, name, preview }]
            }
            InboundEvent::ToolResult { invocation_id, name, is_error, detail } => {
                let id = invocation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let status = self.tools.complete(&id, &name, !is_error, &detail);
                let mut notices = vec![SessionNotice::ToolFinished {
                    id,
                    name: name.clone(),
                    status,
                    detail: detail.clone(),
                    remove_after: removal_grace(status),
                }];
                if is_error {
                    notices.push(SessionNotice::SystemNotice(format!(
                        "tool {name} failed: {detail}"
                    )));
                }
                notices
            }
            InboundEvent::ResultFinal {
                cost,
                duration_ms,
                turns,
                final_text,
                thinking,
                is_error,
                error,
            } => {
                let entry = self.turn.finalize(final_text, thinking);
                self.history.append(entry.clone());
                self.session.message_count += 1;
                self.session.turn_count = turns.unwrap_or(self.session.turn_count + 1);
                self.session.total_cost += cost;
                self.persist();

                let mut notices =
                    vec![SessionNotice::TurnCompleted { entry, cost, duration_ms, is_error }];
                if let Some(error) = error.filter(|_| is_error) {
                    notices.push(SessionNotice::ErrorNotice(error));
                }
                notices
            }
            InboundEvent::ErrorEvent { message } => {
                // Surfaced only; an in-flight turn keeps accumulating until
                // its own terminal event arrives.
                vec![SessionNotice::ErrorNotice(message)]
            }
            InboundEvent::Status { status, message } => {
                debug!(status = %status, message = %message, "server status");
                Vec::new()
            }
            InboundEvent::Unknown { kind } => {
                debug!(kind = %kind, "ignoring unknown frame type");
                Vec::new()
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.history.persist(
            self.store.as_ref(),
            self.session.conversation_id.as_deref(),
        ) {
            warn!("failed to persist history: {e}");
        }
    }
}
