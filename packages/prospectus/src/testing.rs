//! Testing utilities including a mock completion service.
//!
//! Useful for exercising the pipeline without a live model endpoint.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{CompletionError, CompletionResult};
use crate::pipeline::prompts::TRUNCATION_MARKER;
use crate::traits::{CompletionModel, CompletionRequest};

/// Record of one call made to the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub schema_name: String,
    pub context_len: usize,
    pub truncated: bool,
}

/// A mock completion service with scripted responses.
///
/// Responses are queued per schema name and consumed in dispatch order;
/// missing scripts fall back to an empty JSON object, which deserializes to
/// the schema's default. Failures can be injected per schema. Internals sit
/// behind `Arc`s, so a clone observes the calls made through the original.
#[derive(Clone, Default)]
pub struct MockCompletion {
    responses: Arc<RwLock<HashMap<String, VecDeque<serde_json::Value>>>>,
    fail_first: Arc<RwLock<HashMap<String, usize>>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a schema; one is consumed per call.
    pub fn with_response(self, schema_name: impl Into<String>, value: serde_json::Value) -> Self {
        self.responses
            .write()
            .unwrap()
            .entry(schema_name.into())
            .or_default()
            .push_back(value);
        self
    }

    /// Make the first `count` calls for a schema fail with a scripted API
    /// error. With a retry budget of N, failing one batch takes N scripted
    /// failures.
    pub fn with_failures(self, schema_name: impl Into<String>, count: usize) -> Self {
        self.fail_first
            .write()
            .unwrap()
            .insert(schema_name.into(), count);
        self
    }

    /// Delay every call (for timeout and concurrency tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All calls made so far, in dispatch order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Highest number of simultaneously in-flight calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<serde_json::Value> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.calls.write().unwrap().push(MockCall {
            schema_name: request.schema_name.clone(),
            context_len: request.context.len(),
            truncated: request.context.ends_with(TRUNCATION_MARKER),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_fail = {
            let mut guard = self.fail_first.write().unwrap();
            match guard.get_mut(&request.schema_name) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(CompletionError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }

        let scripted = self
            .responses
            .write()
            .unwrap()
            .get_mut(&request.schema_name)
            .and_then(|queue| queue.pop_front());

        Ok(scripted.unwrap_or_else(|| serde_json::json!({})))
    }
}
