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

//! Connection lifecycle: a synchronous reconnect state machine plus the
//! background WebSocket task that drives it.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::backoff::{MAX_RETRIES, reconnect_delay};
use crate::protocol::{ClientCommand, InboundEvent, decode_frame};

/// Where the link currently stands, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Automatic recovery exhausted its retries; only a manual reconnect
    /// leaves this state.
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Decision after the socket closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Schedule reconnect attempt `attempt` (1-based) after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// Retries exhausted, stay down until told otherwise.
    GaveUp,
}

/// Tracks reconnect attempts and the visible [`ConnectionState`].
///
/// Purely synchronous so the transition rules can be tested without a
/// socket; [`connection_task`] drives it from the async side.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    attempt: u32,
    ever_connected: bool,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempt: 0,
            ever_connected: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// A dial is starting. Shows `Reconnecting` when this is a retry rather
    /// than the first dial of the current cycle.
    pub fn begin_connect(&mut self) -> ConnectionState {
        self.state = if self.attempt > 0 {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Connecting
        };
        self.state
    }

    /// The socket opened. Returns whether this recovered a previously live
    /// link (as opposed to the first successful connect).
    pub fn on_open(&mut self) -> bool {
        let recovered = self.ever_connected;
        self.ever_connected = true;
        self.attempt = 0;
        self.state = ConnectionState::Connected;
        recovered
    }

    /// The socket closed or the dial failed. Consumes one retry.
    pub fn on_close(&mut self) -> CloseOutcome {
        if self.attempt >= MAX_RETRIES {
            self.state = ConnectionState::Failed;
            return CloseOutcome::GaveUp;
        }
        let delay = reconnect_delay(self.attempt);
        self.attempt += 1;
        self.state = ConnectionState::Reconnecting;
        CloseOutcome::Retry {
            attempt: self.attempt,
            delay,
        }
    }

    /// A user-requested reconnect restarts the retry budget from zero.
    pub fn reset_for_manual_reconnect(&mut self) {
        self.attempt = 0;
        self.state = ConnectionState::Disconnected;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands from the session into the background link task.
#[derive(Debug)]
pub enum LinkCommand {
    /// Serialize and send one outbound frame.
    Send(ClientCommand),
    /// Drop the current socket (if any) and dial again immediately.
    Reconnect,
}

/// Notifications from the background link task back to the session.
#[derive(Debug)]
pub enum LinkEvent {
    StateChanged(ConnectionState),
    /// Socket is open. `recovered` means an earlier link existed this run.
    Connected { recovered: bool },
    /// A decoded inbound frame.
    Frame(InboundEvent),
    /// A send arrived while the link was down; the frame is handed back so
    /// the session can tell the user instead of losing the message.
    SendRejected(ClientCommand),
    RetryScheduled { attempt: u32, delay: Duration },
    /// Automatic recovery gave up; waiting for a manual reconnect.
    GaveUp,
}

/// Background task managing the WebSocket with auto-reconnect.
///
/// Runs until the command channel closes. Frames that fail to decode are
/// logged and dropped so one malformed message cannot kill the stream.
pub async fn connection_task(
    url: String,
    mut command_rx: mpsc::UnboundedReceiver<LinkCommand>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
) {
    let mut link = ConnectionManager::new();

    loop {
        let state = link.begin_connect();
        let _ = event_tx.send(LinkEvent::StateChanged(state));
        info!(url = %url, "connecting");

        let mut manual_redial = false;
        match connect_async(&url).await {
            Ok((ws_stream, _)) => {
                let recovered = link.on_open();
                let _ = event_tx.send(LinkEvent::StateChanged(ConnectionState::Connected));
                let _ = event_tx.send(LinkEvent::Connected { recovered });
                info!(recovered, "connected");

                let (mut ws_write, mut ws_read) = ws_stream.split();

                loop {
                    tokio::select! {
                        cmd = command_rx.recv() => match cmd {
                            Some(LinkCommand::Send(frame)) => {
                                match serde_json::to_string(&frame) {
                                    Ok(json) => {
                                        if let Err(e) = ws_write.send(WsMessage::Text(json.into())).await {
                                            warn!(error = %e, "send failed, dropping link");
                                            break;
                                        }
                                    }
                                    Err(e) => warn!(error = %e, "could not serialize outbound frame"),
                                }
                            }
                            Some(LinkCommand::Reconnect) => {
                                info!("manual reconnect requested");
                                let _ = ws_write.send(WsMessage::Close(None)).await;
                                link.reset_for_manual_reconnect();
                                manual_redial = true;
                                break;
                            }
                            // Session dropped, shut the task down.
                            None => return,
                        },
                        msg = ws_read.next() => match msg {
                            Some(Ok(WsMessage::Text(text))) => match decode_frame(&text) {
                                Ok(event) => {
                                    let _ = event_tx.send(LinkEvent::Frame(event));
                                }
                                Err(e) => warn!(error = %e, "dropping undecodable frame"),
                            },
                            Some(Ok(WsMessage::Close(_))) => {
                                info!("server closed connection");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!(error = %e, "websocket error");
                                break;
                            }
                            None => {
                                info!("websocket stream ended");
                                break;
                            }
                        },
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "connection attempt failed");
            }
        }

        // A user-requested reconnect dials again right away; it is not a
        // dropped link and consumes no retry.
        if manual_redial {
            continue;
        }

        match link.on_close() {
            CloseOutcome::Retry { attempt, delay } => {
                let _ = event_tx.send(LinkEvent::StateChanged(ConnectionState::Reconnecting));
                let _ = event_tx.send(LinkEvent::RetryScheduled { attempt, delay });
                info!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting after backoff");

                // Only a manual reconnect cuts the wait short; sends bounce
                // back to the session and the backoff keeps running.
                let sleep = tokio::time::sleep(delay);
                tokio::pin!(sleep);
                loop {
                    tokio::select! {
                        () = &mut sleep => break,
                        cmd = command_rx.recv() => match cmd {
                            Some(LinkCommand::Reconnect) => {
                                link.reset_for_manual_reconnect();
                                break;
                            }
                            Some(LinkCommand::Send(frame)) => {
                                debug!("rejecting send while disconnected");
                                let _ = event_tx.send(LinkEvent::SendRejected(frame));
                            }
                            None => return,
                        },
                    }
                }
            }
            CloseOutcome::GaveUp => {
                let _ = event_tx.send(LinkEvent::StateChanged(ConnectionState::Failed));
                let _ = event_tx.send(LinkEvent::GaveUp);
                warn!("giving up after {MAX_RETRIES} reconnect attempts");

                // Only an explicit reconnect leaves the failed state.
                loop {
                    match command_rx.recv().await {
                        Some(LinkCommand::Reconnect) => {
                            link.reset_for_manual_reconnect();
                            break;
                        }
                        Some(LinkCommand::Send(frame)) => {
                            debug!("rejecting send while failed");
                            let _ = event_tx.send(LinkEvent::SendRejected(frame));
                        }
                        None => return,
                    }
                }
            }
        }
    }
}
