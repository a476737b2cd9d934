// =====
// TESTS: 7
// =====
//
// Tool activity tracking: start -> result -> timed removal, including the
// degenerate orders real servers produce.

use std::time::Duration;

use chat_client_rust::session::{SessionNotice, ToolStatus};
use pretty_assertions::assert_eq;

use crate::helpers::{dispatch_raw, test_session};

fn finished(notices: &[SessionNotice]) -> (&str, ToolStatus, Duration) {
    for notice in notices {
        if let SessionNotice::ToolFinished { id, status, remove_after, .. } = notice {
            return (id, *status, *remove_after);
        }
    }
    panic!("no ToolFinished notice in {notices:?}");
}

#[tokio::test]
async fn start_then_result_marks_the_invocation_done() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(
        &mut chat,
        r#"{"type":"tool_start","tool":"Read","tool_use_id":"t1","input":{"path":"a.rs"}}"#,
    );
    assert_eq!(chat.tools().running_count(), 1);

    let notices = dispatch_raw(
        &mut chat,
        r#"{"type":"tool_result","tool":"Read","tool_use_id":"t1","content":"ok"}"#,
    );
    let (id, status, grace) = finished(&notices);
    assert_eq!(id, "t1");
    assert_eq!(status, ToolStatus::Done);
    assert_eq!(grace, Duration::from_millis(3000));
    assert_eq!(chat.tools().running_count(), 0);
}

#[tokio::test]
async fn failed_tool_gets_the_longer_grace_and_a_system_line() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(
        &mut chat,
        r#"{"type":"tool_start","tool":"Bash","tool_use_id":"t2","input":"rm x"}"#,
    );
    let notices = dispatch_raw(
        &mut chat,
        r#"{"type":"tool_result","tool":"Bash","tool_use_id":"t2","is_error":true,"error":"exit 1"}"#,
    );
    let (_, status, grace) = finished(&notices);
    assert_eq!(status, ToolStatus::Error);
    assert_eq!(grace, Duration::from_millis(6000));
    assert!(notices.iter().any(|n| matches!(n, SessionNotice::SystemNotice(_))));
}

#[tokio::test]
async fn orphan_result_synthesizes_a_trackable_entry() {
    let (mut chat, _rx) = test_session();
    let notices = dispatch_raw(
        &mut chat,
        r#"{"type":"tool_result","tool":"Search","tool_use_id":"ghost","content":"42"}"#,
    );
    let (id, status, _) = finished(&notices);
    assert_eq!(id, "ghost");
    assert_eq!(status, ToolStatus::Done);
    assert_eq!(chat.tools().len(), 1);
}

#[tokio::test]
async fn parallel_invocations_resolve_independently() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"tool_start","tool":"Read","tool_use_id":"a"}"#);
    dispatch_raw(&mut chat, r#"{"type":"tool_start","tool":"Bash","tool_use_id":"b"}"#);
    assert_eq!(chat.tools().running_count(), 2);

    dispatch_raw(&mut chat, r#"{"type":"tool_result","tool":"Read","tool_use_id":"a"}"#);
    assert_eq!(chat.tools().get("a").map(|t| t.status), Some(ToolStatus::Done));
    assert_eq!(chat.tools().get("b").map(|t| t.status), Some(ToolStatus::Running));

    dispatch_raw(
        &mut chat,
        r#"{"type":"tool_result","tool":"Bash","tool_use_id":"b","is_error":true,"error":"boom"}"#,
    );
    assert_eq!(chat.tools().get("b").map(|t| t.status), Some(ToolStatus::Error));
    assert_eq!(chat.tools().running_count(), 0);
}

#[tokio::test]
async fn expiry_removes_the_entry_after_the_grace_notice() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"tool_start","tool":"Read","tool_use_id":"t3"}"#);
    dispatch_raw(&mut chat, r#"{"type":"tool_result","tool":"Read","tool_use_id":"t3"}"#);
    assert_eq!(chat.tools().len(), 1);
    chat.expire_tool("t3");
    assert!(chat.tools().is_empty());
}

#[tokio::test]
async fn start_without_an_id_still_produces_a_tracked_invocation() {
    let (mut chat, _rx) = test_session();
    let notices =
        dispatch_raw(&mut chat, r#"{"type":"tool_start","tool_name":"Fetch","action":"GET /"}"#);
    let id = match &notices[0] {
        SessionNotice::ToolStarted { id, name, preview } => {
            assert_eq!(name, "Fetch");
            assert_eq!(preview, "GET /");
            id.clone()
        }
        other => panic!("unexpected notice: {other:?}"),
    };
    assert!(chat.tools().get(&id).is_some());
}

#[tokio::test]
async fn long_tool_input_is_truncated_in_the_preview() {
    let (mut chat, _rx) = test_session();
    let long = "x".repeat(500);
    let raw = format!(
        r#"{{"type":"tool_start","tool":"Write","tool_use_id":"t4","input":"{long}"}}"#
    );
    let notices = dispatch_raw(&mut chat, &raw);
    match &notices[0] {
        SessionNotice::ToolStarted { preview, .. } => {
            assert_eq!(preview.chars().count(), 120);
            assert!(preview.ends_with('\u{2026}'));
        }
        other => panic!("unexpected notice: {other:?}"),
    }
}
