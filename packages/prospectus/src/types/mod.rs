//! Data types: input contract, chunks, target schemas, configuration.

pub mod chunk;
pub mod config;
pub mod document;
pub mod profile;

pub use chunk::{ChunkMetadata, ChunkType, TextChunk};
pub use config::{ExtractionConfig, SegmenterConfig, MIN_CHUNK_OVERLAP};
pub use document::{ParsedDocument, ParsedPage};
pub use profile::{
    AdmissionInfo, ContactInfo, Department, DepartmentList, ExtractionMetadata, Facility,
    FacilityList, FeeItem, FeeList, InstitutionInfo, InstitutionProfile, Program,
};
