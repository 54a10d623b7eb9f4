//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors from a single completion-service call.
///
/// The orchestrator treats every variant the same way: retry up to the
/// configured budget, then degrade the batch to the schema's default.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport-level failure reaching the service
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The service answered with a non-success status
    #[error("completion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be read as JSON
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    /// The response parsed as JSON but did not conform to the target shape
    #[error("response did not match schema {schema}: {source}")]
    SchemaValidation {
        schema: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for completion-service operations.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;
