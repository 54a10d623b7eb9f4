//! Extraction pipeline - the orchestration half of the library.
//!
//! The pipeline sequences, per document:
//! - Relevance selection (label -> fallback -> keyword -> everything)
//! - Batching and bounded-concurrency dispatch with retry/degrade
//! - Per-schema merging of partial results
//! - Aggregate assembly with metadata

pub mod driver;
pub mod merge;
pub mod orchestrate;
pub mod prompts;
pub mod select;

pub use driver::ProfileExtractor;
pub use merge::{confidence_score, merge_outcomes, MergeBatches, SectionResult};
pub use orchestrate::{BatchOutcome, BatchStatus, ExtractionOrchestrator};
pub use prompts::{SYSTEM_PROMPT, TRUNCATION_MARKER};
pub use select::{batch_chunks, select_relevant, stride_sample, SectionTarget};
