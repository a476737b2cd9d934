// =====
// TESTS: 6
// =====
//
// Streaming turn reconstruction: deltas arrive in order, the terminal
// event finalizes exactly one history entry.

use chat_client_rust::protocol::InboundEvent;
use chat_client_rust::session::{Role, SessionNotice};
use pretty_assertions::assert_eq;

use crate::helpers::{dispatch, dispatch_raw, test_session};

#[tokio::test]
async fn chunks_concatenate_in_arrival_order() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"Hel"}"#);
    dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"lo"}"#);
    dispatch_raw(&mut chat, r#"{"type":"result","cost":0.01,"duration_ms":2000}"#);

    assert_eq!(chat.history().len(), 1);
    assert_eq!(chat.history()[0].role, Role::Assistant);
    assert_eq!(chat.history()[0].content, "Hello");
}

#[tokio::test]
async fn final_content_from_the_terminal_event_wins() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"par"}"#);
    dispatch_raw(
        &mut chat,
        r#"{"type":"result","content":"the full answer","cost":0.0,"duration_ms":1000}"#,
    );
    assert_eq!(chat.history()[0].content, "the full answer");
}

#[tokio::test]
async fn thinking_is_kept_separate_from_main_content() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"thinking","content":"consider "}"#);
    dispatch_raw(&mut chat, r#"{"type":"thinking","content":"options"}"#);
    dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"answer"}"#);
    dispatch_raw(&mut chat, r#"{"type":"result","cost":0.0,"duration_ms":0}"#);

    assert_eq!(chat.history()[0].content, "answer");
    assert_eq!(chat.history()[0].thinking.as_deref(), Some("consider options"));
}

#[tokio::test]
async fn terminal_event_with_no_deltas_appends_an_empty_entry() {
    let (mut chat, _rx) = test_session();
    dispatch_raw(&mut chat, r#"{"type":"result","cost":0.0,"duration_ms":0}"#);
    assert_eq!(chat.history().len(), 1);
    assert_eq!(chat.history()[0].content, "");
}

#[tokio::test]
async fn deltas_stream_out_as_notices_while_accumulating() {
    let (mut chat, _rx) = test_session();
    let notices = dispatch_raw(&mut chat, r#"{"type":"text_chunk","content":"Hi"}"#);
    assert_eq!(notices, vec![SessionNotice::TextDelta("Hi".to_owned())]);
    // Nothing in history until the terminal event.
    assert!(chat.history().is_empty());
}

#[tokio::test]
async fn consecutive_turns_do_not_bleed_into_each_other() {
    let (mut chat, _rx) = test_session();
    dispatch(&mut chat, InboundEvent::TextDelta { content: "one".to_owned() });
    dispatch_raw(&mut chat, r#"{"type":"result","cost":0.0,"duration_ms":0}"#);
    dispatch(&mut chat, InboundEvent::TextDelta { content: "two".to_owned() });
    dispatch_raw(&mut chat, r#"{"type":"result","cost":0.0,"duration_ms":0}"#);

    let contents: Vec<_> = chat.history().iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
}
