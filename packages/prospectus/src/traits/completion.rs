//! Completion-service trait - the seam to the external language model.
//!
//! Implementations wrap a specific provider (an OpenAI-compatible endpoint,
//! a local model server, a test mock) and handle the specifics of the wire
//! format. The pipeline only ever sees this trait.

use async_trait::async_trait;

use crate::error::CompletionResult;

/// One structured-completion request.
///
/// Carries the system instruction, the task instruction plus assembled
/// context, and the JSON schema the response must conform to.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction framing the task
    pub system: String,

    /// Task instruction for this schema (what to extract)
    pub instruction: String,

    /// Context string: chunk texts joined with blank lines, possibly truncated
    pub context: String,

    /// Name of the target schema (for logging and schema registration)
    pub schema_name: String,

    /// JSON schema the response must conform to
    pub schema: serde_json::Value,
}

impl CompletionRequest {
    /// Create a new request.
    pub fn new(
        instruction: impl Into<String>,
        context: impl Into<String>,
        schema_name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            system: String::new(),
            instruction: instruction.into(),
            context: context.into(),
            schema_name: schema_name.into(),
            schema,
        }
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// The full user message: instruction followed by the context block.
    pub fn user_message(&self) -> String {
        format!("{}\n\nDATA:\n{}", self.instruction, self.context)
    }
}

/// Completion-service abstraction.
///
/// The service either returns a JSON value intended to conform to
/// `request.schema`, or fails. Timeout, transport and non-conforming
/// responses are all surfaced as [`crate::error::CompletionError`] and are
/// handled identically by the caller (retry, then default).
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Execute one structured completion.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<serde_json::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_layout() {
        let request = CompletionRequest::new(
            "Extract all campus facilities.",
            "The library seats 500 students.",
            "facilities",
            serde_json::json!({}),
        );

        let message = request.user_message();
        assert!(message.starts_with("Extract all campus facilities."));
        assert!(message.contains("\n\nDATA:\n"));
        assert!(message.ends_with("The library seats 500 students."));
    }
}
