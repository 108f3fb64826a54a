use super::*;

#[test]
fn messages_match_user_copy() {
    assert_eq!(PipelineError::EmptyPrompt.to_string(), "Prompt cannot be empty.");
    assert_eq!(
        PipelineError::ServiceUnavailable { cause: "connection refused".into() }.to_string(),
        "Server is temporarily unavailable. Please try again later."
    );
    assert_eq!(PipelineError::EmptyResult.to_string(), "No result returned from the backend.");
}

#[test]
fn export_message_appends_cause() {
    let err = PipelineError::from(ExportError::Fetch("connection reset".into()));
    assert_eq!(err.to_string(), "Failed to download flowchart: connection reset");
}

#[test]
fn codes_are_stable() {
    assert_eq!(PipelineError::EmptyPrompt.error_code(), "E_EMPTY_PROMPT");
    assert_eq!(PipelineError::ServiceUnavailable { cause: String::new() }.error_code(), "E_SERVICE_UNAVAILABLE");
    assert_eq!(PipelineError::EmptyResult.error_code(), "E_EMPTY_RESULT");
    assert_eq!(PipelineError::Export(ExportError::Decode("bad".into())).error_code(), "E_EXPORT");
}

#[test]
fn only_validation_is_not_retryable() {
    assert!(!PipelineError::EmptyPrompt.retryable());
    assert!(PipelineError::ServiceUnavailable { cause: String::new() }.retryable());
    assert!(PipelineError::EmptyResult.retryable());
    assert!(PipelineError::Export(ExportError::Write("disk full".into())).retryable());
}
