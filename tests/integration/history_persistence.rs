// =====
// TESTS: 6
// =====
//
// Durable history: what one session writes, the next session reads back.

use chat_client_rust::session::{MAX_HISTORY, Role};
use chat_client_rust::storage::FsSnapshotStore;
use pretty_assertions::assert_eq;

use crate::helpers::{connect, dispatch_raw, test_session_with_store};

fn store_at(dir: &tempfile::TempDir) -> Box<FsSnapshotStore> {
    Box::new(FsSnapshotStore::new(dir.path().join("history.json")))
}

#[tokio::test]
async fn a_finished_turn_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (mut chat, _rx) = test_session_with_store(store_at(&dir));
        connect(&mut chat);
        chat.send_message("hi there").unwrap();
        dispatch_raw(&mut chat, r#"{"type":"user_message_saved","conversation_id":"c1"}"#);
        dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"hello"}"#);
        dispatch_raw(&mut chat, r#"{"type":"result","cost":0.0,"duration_ms":10}"#);
    }

    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    let restored = chat.restore_history();
    assert_eq!(restored, 2);
    assert_eq!(chat.session().conversation_id.as_deref(), Some("c1"));
    assert_eq!(chat.history()[0].role, Role::User);
    assert_eq!(chat.history()[0].content, "hi there");
    assert_eq!(chat.history()[1].role, Role::Assistant);
    assert_eq!(chat.history()[1].content, "hello");
}

#[tokio::test]
async fn restore_with_no_snapshot_leaves_an_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    assert_eq!(chat.restore_history(), 0);
    assert!(chat.history().is_empty());
    assert_eq!(chat.session().conversation_id, None);
}

#[tokio::test]
async fn corrupt_snapshot_degrades_to_a_fresh_start() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("history.json"), "{definitely not json").unwrap();

    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    assert_eq!(chat.restore_history(), 0);
    assert!(chat.history().is_empty());
}

#[tokio::test]
async fn new_conversation_removes_the_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    connect(&mut chat);
    chat.send_message("hi").unwrap();
    assert!(path.exists());

    chat.new_conversation().unwrap();
    assert!(!path.exists());
    assert!(chat.history().is_empty());
}

#[tokio::test]
async fn history_never_grows_past_the_cap() {
    let dir = tempfile::tempdir().unwrap();
    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    connect(&mut chat);
    for i in 0..(MAX_HISTORY + 10) {
        chat.send_message(&format!("msg {i}")).unwrap();
    }
    assert_eq!(chat.history().len(), MAX_HISTORY);
    assert_eq!(chat.history()[0].content, "msg 10", "oldest entries evicted first");

    let (mut reloaded, _rx) = test_session_with_store(store_at(&dir));
    assert_eq!(reloaded.restore_history(), MAX_HISTORY);
}

#[tokio::test]
async fn snapshot_keeps_the_browser_compatible_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let (mut chat, _rx) = test_session_with_store(store_at(&dir));
    connect(&mut chat);
    chat.send_message("hello").unwrap();
    dispatch_raw(&mut chat, r#"{"type":"user_message_saved","conversation_id":"c9"}"#);

    let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["conversationId"], "c9");
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "hello");
}
