// ABOUTME: Tests for LLM types - serialization and builder helpers.
// ABOUTME: Verifies the JSON shape shared by the providers.

use super::*;

#[test]
fn test_role_serialization() {
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        "\"assistant\""
    );
}

#[test]
fn test_role_deserialization() {
    assert_eq!(
        serde_json::from_str::<Role>("\"user\"").unwrap(),
        Role::User
    );
    assert_eq!(
        serde_json::from_str::<Role>("\"assistant\"").unwrap(),
        Role::Assistant
    );
}

#[test]
fn test_message_helpers() {
    let msg = Message::user("Hello");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hello");

    let msg = Message::assistant("Hi");
    assert_eq!(msg.role, Role::Assistant);
}

#[test]
fn test_request_builder() {
    let req = Request::new("gpt-4o-mini")
        .message(Message::user("first"))
        .messages(vec![Message::assistant("reply"), Message::user("second")])
        .system("Be brief")
        .max_tokens(256)
        .temperature(0.2);

    assert_eq!(req.model, "gpt-4o-mini");
    assert_eq!(req.messages.len(), 3);
    assert_eq!(req.system.as_deref(), Some("Be brief"));
    assert_eq!(req.max_tokens, Some(256));
    assert_eq!(req.temperature, Some(0.2));
    assert_eq!(req.last_user_text(), Some("second"));
}

#[test]
fn test_last_user_text_empty() {
    let req = Request::new("m");
    assert!(req.last_user_text().is_none());
}

#[test]
fn test_stop_reason_serialization() {
    assert_eq!(
        serde_json::to_string(&StopReason::EndTurn).unwrap(),
        "\"end_turn\""
    );
    assert_eq!(
        serde_json::to_string(&StopReason::MaxTokens).unwrap(),
        "\"max_tokens\""
    );
}

#[test]
fn test_response_from_text() {
    let resp = Response::from_text("m", "done");
    assert_eq!(resp.text, "done");
    assert!(!resp.is_truncated());
    assert_eq!(resp.usage, Usage::default());
}
