//! Extraction orchestration - batched, bounded-concurrency dispatch to the
//! completion service with retry and degrade-to-default.

use std::sync::Arc;

use futures::future::join_all;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::CompletionError;
use crate::pipeline::prompts::{SYSTEM_PROMPT, TRUNCATION_MARKER};
use crate::segment::snap_to_char_boundary;
use crate::traits::{CompletionModel, CompletionRequest};
use crate::types::{ExtractionConfig, TextChunk};

/// Whether a batch produced data or degraded to the schema default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Extracted,
    Failed,
}

/// One batch's result, explicitly marked so a degraded default can never be
/// mistaken for extracted data.
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub value: T,
    pub status: BatchStatus,
}

impl<T> BatchOutcome<T> {
    pub fn extracted(value: T) -> Self {
        Self {
            value,
            status: BatchStatus::Extracted,
        }
    }

    pub fn failed(value: T) -> Self {
        Self {
            value,
            status: BatchStatus::Failed,
        }
    }

    pub fn is_extracted(&self) -> bool {
        self.status == BatchStatus::Extracted
    }
}

/// Dispatches batches to the completion service.
///
/// A single orchestrator instance owns the process-wide concurrency gate:
/// however many sections or batches are queued, at most
/// `max_concurrent_requests` completions are in flight at once. Batch
/// results come back in submission order regardless of completion timing.
pub struct ExtractionOrchestrator<M: CompletionModel> {
    model: M,
    semaphore: Arc<Semaphore>,
    config: ExtractionConfig,
}

impl<M: CompletionModel> ExtractionOrchestrator<M> {
    pub fn new(model: M, config: ExtractionConfig) -> Self {
        let permits = config.max_concurrent_requests.max(1);
        Self {
            model,
            semaphore: Arc::new(Semaphore::new(permits)),
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Join chunk texts into one context string, truncating to the
    /// configured budget with an explicit marker.
    pub fn build_context(&self, chunks: &[&TextChunk]) -> String {
        let joined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.cap_context(joined, self.config.max_context_chars)
    }

    fn cap_context(&self, text: String, budget: usize) -> String {
        if text.len() <= budget {
            return text;
        }
        let cut = snap_to_char_boundary(&text, budget);
        warn!(from = text.len(), to = cut, "truncating context");
        format!("{}{}", &text[..cut], TRUNCATION_MARKER)
    }

    /// Run every batch of one section. Dispatch is concurrent under the
    /// global semaphore; the returned outcomes are in batch order.
    pub async fn extract_batches<T>(
        &self,
        batches: &[Vec<&TextChunk>],
        schema_name: &str,
        instruction: &str,
    ) -> Vec<BatchOutcome<T>>
    where
        T: DeserializeOwned + Default + JsonSchema,
    {
        let schema = match schema_value::<T>() {
            Ok(schema) => schema,
            Err(err) => {
                warn!(schema = schema_name, error = %err, "schema generation failed");
                return batches.iter().map(|_| BatchOutcome::failed(T::default())).collect();
            }
        };

        let calls = batches.iter().enumerate().map(|(index, batch)| {
            let request = CompletionRequest::new(
                instruction,
                self.build_context(batch),
                schema_name,
                schema.clone(),
            )
            .with_system(SYSTEM_PROMPT);

            async move { self.call_with_retry::<T>(request, index).await }
        });

        join_all(calls).await
    }

    /// One unbatched call over an already-assembled context (used for the
    /// institution-info window). Same retry and degrade policy as a batch.
    pub async fn extract_once<T>(
        &self,
        context: String,
        schema_name: &str,
        instruction: &str,
    ) -> BatchOutcome<T>
    where
        T: DeserializeOwned + Default + JsonSchema,
    {
        let schema = match schema_value::<T>() {
            Ok(schema) => schema,
            Err(err) => {
                warn!(schema = schema_name, error = %err, "schema generation failed");
                return BatchOutcome::failed(T::default());
            }
        };

        let request = CompletionRequest::new(instruction, context, schema_name, schema)
            .with_system(SYSTEM_PROMPT);
        self.call_with_retry::<T>(request, 0).await
    }

    /// Retry up to the configured budget, then degrade to the default.
    /// Timeout, transport and shape failures are treated identically.
    async fn call_with_retry<T>(&self, request: CompletionRequest, batch_index: usize) -> BatchOutcome<T>
    where
        T: DeserializeOwned + Default,
    {
        let attempts = self.config.max_retries.max(1);
        for attempt in 1..=attempts {
            match self.call_once::<T>(&request).await {
                Ok(value) => {
                    debug!(
                        schema = %request.schema_name,
                        batch = batch_index,
                        attempt,
                        "batch extracted"
                    );
                    return BatchOutcome::extracted(value);
                }
                Err(err) => {
                    warn!(
                        schema = %request.schema_name,
                        batch = batch_index,
                        attempt,
                        error = %err,
                        "completion attempt failed"
                    );
                }
            }
        }

        warn!(
            schema = %request.schema_name,
            batch = batch_index,
            "batch degraded to default after {attempts} attempts"
        );
        BatchOutcome::failed(T::default())
    }

    async fn call_once<T>(&self, request: &CompletionRequest) -> Result<T, CompletionError>
    where
        T: DeserializeOwned,
    {
        let _permit = self.semaphore.acquire().await.unwrap();

        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let value = match tokio::time::timeout(timeout, self.model.complete(request)).await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(CompletionError::Timeout {
                    seconds: self.config.request_timeout_secs,
                })
            }
        };

        serde_json::from_value(value).map_err(|err| CompletionError::SchemaValidation {
            schema: request.schema_name.clone(),
            source: err,
        })
    }
}

/// JSON schema for the target shape, as a plain value for the request.
fn schema_value<T: JsonSchema>() -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(schemars::schema_for!(T))
}
