//! Configuration values for segmentation and extraction.
//!
//! Plain value structs; how they are loaded (env, file, CLI) is the
//! caller's concern.

use serde::{Deserialize, Serialize};

/// Floor applied to `chunk_overlap`; smaller values lose too much context
/// at chunk seams to be useful.
pub const MIN_CHUNK_OVERLAP: usize = 300;

/// Configuration for the segmentation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Soft maximum characters per paragraph chunk
    pub chunk_size: usize,

    /// Characters carried over to the next chunk; floored at
    /// [`MIN_CHUNK_OVERLAP`]
    pub chunk_overlap: usize,

    /// Regex patterns for recurring boilerplate lines (running
    /// headers/footers, bare page numbers, masthead lines)
    #[serde(default)]
    pub boilerplate_patterns: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: MIN_CHUNK_OVERLAP,
            boilerplate_patterns: default_boilerplate_patterns(),
        }
    }
}

fn default_boilerplate_patterns() -> Vec<String> {
    vec![
        // bare page numbers
        r"^\s*\d{1,4}\s*$".to_string(),
        // "Page 12" / "Page 12 of 300" runners
        r"(?i)^\s*page\s+\d+(\s+of\s+\d+)?\s*$".to_string(),
        // masthead lines repeated on every page
        r"(?i)^\s*(undergraduate|graduate)?\s*prospectus(\s+\d{4}(-\d{2,4})?)?\s*$".to_string(),
    ]
}

impl SegmenterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the soft chunk-size limit.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the overlap carried between chunks; values below
    /// [`MIN_CHUNK_OVERLAP`] are raised to the floor.
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap.max(MIN_CHUNK_OVERLAP);
        self
    }

    /// Replace the boilerplate pattern set.
    pub fn with_boilerplate_patterns(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.boilerplate_patterns = patterns.into_iter().map(|p| p.into()).collect();
        self
    }
}

/// Configuration for the extraction orchestrator and pipeline driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Global cap on simultaneously in-flight completion requests
    pub max_concurrent_requests: usize,

    /// Chunks per batch (one completion request per batch)
    pub batch_size: usize,

    /// Character budget for one batch's context string
    pub max_context_chars: usize,

    /// Default per-section cap on selected chunks (even-stride sampled)
    pub max_chunks_per_section: usize,

    /// Attempts per request before a batch degrades to its default
    pub max_retries: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Leading chunks used for the institution-info window
    pub info_window_chunks: usize,

    /// Character cap for the institution-info context
    pub info_window_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            batch_size: 15,
            max_context_chars: 20_000,
            max_chunks_per_section: 60,
            max_retries: 3,
            request_timeout_secs: 600,
            info_window_chunks: 5,
            info_window_chars: 4000,
        }
    }
}

impl ExtractionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global in-flight request bound.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the per-batch context character budget.
    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    /// Set the default per-section chunk cap.
    pub fn with_max_chunks_per_section(mut self, max: usize) -> Self {
        self.max_chunks_per_section = max;
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_overlap_floor() {
        let config = SegmenterConfig::new().with_chunk_overlap(50);
        assert_eq!(config.chunk_overlap, MIN_CHUNK_OVERLAP);

        let config = SegmenterConfig::new().with_chunk_overlap(400);
        assert_eq!(config.chunk_overlap, 400);
    }

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.max_concurrent_requests, 5);
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.max_retries, 3);
    }
}
