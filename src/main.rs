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

use std::fs::OpenOptions;
use std::io::Write as _;

use chat_client_rust::Cli;
use chat_client_rust::connection::connection_task;
use chat_client_rust::error::ChatError;
use chat_client_rust::session::{ChatSession, SessionNotice};
use chat_client_rust::storage::FsSnapshotStore;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

#[allow(clippy::exit)]
fn main() {
    if let Err(err) = run() {
        if let Some(chat_error) = extract_chat_error(&err) {
            eprintln!("{}", chat_error.user_message());
            std::process::exit(1);
        }
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let history_path = match cli.history_file.clone() {
        Some(path) => path,
        None => FsSnapshotStore::default_path()
            .ok_or_else(|| anyhow::anyhow!("no data directory available; pass --history-file"))?,
    };
    let store = FsSnapshotStore::new(history_path);

    let rt = tokio::runtime::Runtime::new()?;
    let local_set = tokio::task::LocalSet::new();
    rt.block_on(local_set.run_until(run_repl(cli, store)))
}

async fn run_repl(cli: Cli, store: FsSnapshotStore) -> anyhow::Result<()> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (expire_tx, mut expire_rx) = mpsc::unbounded_channel::<String>();

    let mut chat = ChatSession::new(Box::new(store), command_tx);
    if cli.new {
        chat.new_conversation()?;
    } else {
        let restored = chat.restore_history();
        if restored > 0 {
            eprintln!("* restored {restored} messages");
        }
    }

    tokio::spawn(connection_task(cli.url.clone(), command_rx, event_tx));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    eprintln!("* type a message, or /new /reconnect /status /quit");

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                for notice in chat.handle_link_event(event) {
                    render(&notice);
                    if let SessionNotice::ToolFinished { id, remove_after, .. } = notice {
                        let expire_tx = expire_tx.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(remove_after).await;
                            let _ = expire_tx.send(id);
                        });
                    }
                }
            }
            Some(id) = expire_rx.recv() => {
                chat.expire_tool(&id);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line {
                    "/quit" => break,
                    "/new" => {
                        chat.new_conversation()?;
                        eprintln!("* started a new conversation");
                    }
                    "/reconnect" => {
                        chat.reconnect()?;
                    }
                    "/status" => {
                        let session = chat.session();
                        eprintln!(
                            "* {} | conversation {} | {} messages | {} turns | ${:.4}",
                            session.connection_state,
                            session.conversation_id.as_deref().unwrap_or("-"),
                            session.message_count,
                            session.turn_count,
                            session.total_cost,
                        );
                    }
                    text => {
                        if let Err(e) = chat.send_message(text) {
                            eprintln!("! {}", e.user_message());
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn render(notice: &SessionNotice) {
    match notice {
        SessionNotice::ConnectionChanged(state) => eprintln!("* {state}"),
        SessionNotice::Reconnected => eprintln!("* connection restored"),
        SessionNotice::RetryScheduled { attempt, delay } => {
            eprintln!("* retrying in {}s (attempt {attempt})", delay.as_secs());
        }
        SessionNotice::RetriesExhausted => {
            eprintln!("! connection lost for good; use /reconnect to try again");
        }
        SessionNotice::ConversationAssigned(id) => eprintln!("* conversation {id}"),
        SessionNotice::TextDelta(chunk) => {
            print!("{chunk}");
            let _ = std::io::stdout().flush();
        }
        // Thinking is captured into history, not streamed to the terminal.
        SessionNotice::ThinkingDelta(_) => {}
        SessionNotice::TurnCompleted { cost, duration_ms, is_error, .. } => {
            println!();
            if *is_error {
                eprintln!("! turn finished with an error");
            }
            eprintln!("* {duration_ms} ms, ${cost:.4}");
        }
        SessionNotice::ToolStarted { name, preview, .. } => {
            if preview.is_empty() {
                eprintln!("[tool] {name} ...");
            } else {
                eprintln!("[tool] {name} {preview}");
            }
        }
        SessionNotice::ToolFinished { name, status, detail, .. } => {
            if detail.is_empty() {
                eprintln!("[tool] {name} {status:?}");
            } else {
                eprintln!("[tool] {name} {status:?}: {detail}");
            }
        }
        SessionNotice::SystemNotice(message) => eprintln!("* {message}"),
        SessionNotice::ErrorNotice(message) => eprintln!("! {message}"),
    }
}

fn extract_chat_error(err: &anyhow::Error) -> Option<ChatError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ChatError>().cloned())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = cli.log_file.as_ref() else {
        if std::env::var_os("RUST_LOG").is_some() {
            eprintln!(
                "RUST_LOG is set, but tracing is disabled without --log-file <PATH>. \
Use --log-file to enable diagnostics."
            );
        }
        return Ok(());
    };

    let directives = cli
        .log_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_owned());
    let filter = tracing_subscriber::EnvFilter::try_new(directives.as_str())
        .map_err(|e| anyhow::anyhow!("invalid tracing filter `{directives}`: {e}"))?;

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    if cli.log_append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    let file = options
        .open(path)
        .map_err(|e| anyhow::anyhow!("failed to open log file {}: {e}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    tracing::info!(
        target: "diagnostics",
        version = env!("CARGO_PKG_VERSION"),
        log_file = %path.display(),
        log_filter = %directives,
        "tracing enabled"
    );

    Ok(())
}
