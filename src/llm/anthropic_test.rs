// ABOUTME: Tests for Anthropic client type conversions.
// ABOUTME: Verifies serialization matches Anthropic API format.

use super::*;

#[test]
fn test_request_serialization() {
    let req = Request::new("claude-3-haiku-20240307")
        .message(Message::user("Hello"))
        .system("You are helpful")
        .max_tokens(1024);

    let anthropic_req = AnthropicRequest::from(&req);

    assert_eq!(anthropic_req.model, "claude-3-haiku-20240307");
    assert_eq!(anthropic_req.max_tokens, 1024);
    assert_eq!(anthropic_req.system, Some("You are helpful".to_string()));
    assert_eq!(anthropic_req.messages.len(), 1);
    assert_eq!(anthropic_req.messages[0].role, "user");
}

#[test]
fn test_request_defaults_max_tokens() {
    let req = Request::new("claude-3-haiku-20240307").message(Message::user("Hi"));
    let anthropic_req = AnthropicRequest::from(&req);
    assert_eq!(anthropic_req.max_tokens, 4096);
}

#[test]
fn test_request_json_format() {
    let req = Request::new("claude-3-haiku-20240307").message(Message::user("Hello"));

    let anthropic_req = AnthropicRequest::from(&req);
    let json = serde_json::to_value(&anthropic_req).unwrap();

    assert_eq!(json["model"], "claude-3-haiku-20240307");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "Hello");
    assert!(json.get("system").is_none());
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_response_deserialization() {
    let json = r#"{
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Hello, "},
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "world"}
        ],
        "model": "claude-3-haiku-20240307",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }"#;

    let resp: AnthropicResponse = serde_json::from_str(json).unwrap();
    let response = Response::from(resp);

    assert_eq!(response.id, "msg_123");
    assert_eq!(response.text, "Hello, world");
    assert_eq!(response.stop_reason, StopReason::EndTurn);
    assert_eq!(response.usage.input_tokens, 10);
    assert_eq!(response.usage.output_tokens, 5);
}

#[test]
fn test_max_tokens_stop_reason() {
    let json = r#"{
        "id": "msg_1",
        "content": [{"type": "text", "text": "cut"}],
        "model": "m",
        "stop_reason": "max_tokens",
        "usage": {"input_tokens": 1, "output_tokens": 1}
    }"#;

    let resp: AnthropicResponse = serde_json::from_str(json).unwrap();
    assert!(Response::from(resp).is_truncated());
}

#[test]
fn test_error_deserialization() {
    let json = r#"{
        "type": "error",
        "error": {"type": "overloaded_error", "message": "Overloaded"}
    }"#;

    let err: AnthropicError = serde_json::from_str(json).unwrap();
    assert_eq!(err.error.error_type, "overloaded_error");
    assert_eq!(err.error.message, "Overloaded");
}
