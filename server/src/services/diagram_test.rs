use super::*;
use crate::state::test_helpers::{MockLlm, text_response};

// =========================================================================
// generate_diagram
// =========================================================================

#[tokio::test]
async fn returns_model_text_verbatim() {
    let llm = MockLlm::new(vec![Ok(text_response("```plantuml\n@startuml\nA->B\n@enduml\n```"))]);
    let text = generate_diagram(&llm, 256, "draw A to B").await.unwrap();
    assert_eq!(text, "```plantuml\n@startuml\nA->B\n@enduml\n```");
}

#[tokio::test]
async fn sends_system_instruction_then_prompt() {
    let llm = MockLlm::new(vec![]);
    generate_diagram(&llm, 256, "login flow").await.unwrap();

    let seen = llm.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], vec![Message::system(SYSTEM_PROMPT), Message::user("login flow")]);
}

#[tokio::test]
async fn empty_prompt_skips_model() {
    let llm = MockLlm::new(vec![]);
    let err = generate_diagram(&llm, 256, "").await.unwrap_err();
    assert!(matches!(err, GenerateError::EmptyPrompt));
    assert_eq!(err.to_string(), "Prompt cannot be empty.");
    assert!(llm.seen().is_empty());
}

#[tokio::test]
async fn whitespace_prompt_is_forwarded() {
    let llm = MockLlm::new(vec![]);
    assert!(generate_diagram(&llm, 256, "   ").await.is_ok());
    assert_eq!(llm.seen().len(), 1);
}

#[tokio::test]
async fn model_failure_propagates() {
    let llm = MockLlm::new(vec![Err(LlmError::ApiResponse { status: 503, body: "busy".into() })]);
    let err = generate_diagram(&llm, 256, "x").await.unwrap_err();
    assert_eq!(err.error_code(), "E_API_RESPONSE");
    assert!(err.retryable());
    assert_eq!(err.to_string(), "API response error: status 503");
}

#[test]
fn empty_prompt_not_retryable() {
    assert_eq!(GenerateError::EmptyPrompt.error_code(), "E_EMPTY_PROMPT");
    assert!(!GenerateError::EmptyPrompt.retryable());
}
