//! Prospectus Extraction Library
//!
//! Turns a parsed multi-page prospectus (text plus extracted tables per
//! page) into a structured institution profile: departments with their
//! programs, facilities, fees and admission rules.
//!
//! # Design Philosophy
//!
//! **"Partial output beats total failure"**
//!
//! - Segmentation is a pure, total function - malformed pages produce
//!   fewer chunks, never errors
//! - Every completion call can degrade to the schema's default; a failed
//!   batch costs its own data and nothing else
//! - Degraded results are explicitly marked, never silently blended in
//! - One process-wide gate bounds in-flight completion requests
//!
//! # Usage
//!
//! ```rust,ignore
//! use prospectus::{OpenAiCompletion, ParsedDocument, ProfileExtractor};
//!
//! let model = OpenAiCompletion::new("llama3.1:8b");
//! let extractor = ProfileExtractor::with_defaults(model);
//!
//! let doc: ParsedDocument = parse_upstream_pdf()?;
//! let profile = extractor.extract(&doc).await;
//! println!("{} departments", profile.departments.len());
//! ```
//!
//! # Modules
//!
//! - [`segment`] - Preprocessing, section classification and chunking
//! - [`pipeline`] - Selection, orchestration, merging, the driver facade
//! - [`traits`] - The completion-service seam
//! - [`completion`] - OpenAI-compatible client implementation
//! - [`types`] - Input contract, chunks, target schemas, configuration
//! - [`testing`] - Mock completion service for tests

pub mod completion;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CompletionError, CompletionResult};
pub use traits::{CompletionModel, CompletionRequest};
pub use types::{
    chunk::{ChunkMetadata, ChunkType, TextChunk},
    config::{ExtractionConfig, SegmenterConfig, MIN_CHUNK_OVERLAP},
    document::{ParsedDocument, ParsedPage},
    profile::{
        AdmissionInfo, ContactInfo, Department, DepartmentList, ExtractionMetadata, Facility,
        FacilityList, FeeItem, FeeList, InstitutionInfo, InstitutionProfile, Program,
    },
};

// Re-export the segmentation engine
pub use segment::{Preprocessor, SectionClassifier, Segmenter};

// Re-export pipeline components
pub use pipeline::{
    BatchOutcome, BatchStatus, ExtractionOrchestrator, MergeBatches, ProfileExtractor,
    SectionResult, SectionTarget,
};

// Re-export the bundled client
pub use completion::OpenAiCompletion;

// Re-export testing utilities
pub use testing::{MockCall, MockCompletion};
