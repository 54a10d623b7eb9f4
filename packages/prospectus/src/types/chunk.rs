//! Chunk types - the unit of segmented text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structural category of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Heading,
    Paragraph,
    Table,
    /// Reserved; the segmenter never currently produces it.
    List,
}

/// Auxiliary chunk information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Content length in characters at creation time
    pub length: usize,

    /// Nearest enclosing header text, when one has been seen
    pub header: Option<String>,
}

/// A bounded unit of document text with a type, page, position and topic
/// label.
///
/// Chunks are created once by the segmenter and are immutable thereafter;
/// selection and orchestration consume them read-only. A re-run over the
/// same document produces a fresh sequence with new identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// Opaque identifier, assigned at creation, never reused
    pub chunk_id: Uuid,

    /// Trimmed content; never empty
    pub text: String,

    pub chunk_type: ChunkType,

    /// 1-based source page
    pub page_number: u32,

    /// Strictly increasing over the document's output sequence, no gaps,
    /// starts at 0
    pub position_in_doc: usize,

    /// Lower-cased topic tag; `"general"` when nothing more specific applies
    pub section_label: String,

    pub metadata: ChunkMetadata,
}

impl TextChunk {
    /// Create a chunk. The text is trimmed on the way in.
    pub fn new(
        text: &str,
        chunk_type: ChunkType,
        page_number: u32,
        position_in_doc: usize,
        section_label: impl Into<String>,
        header: Option<&str>,
    ) -> Self {
        let text = text.trim().to_string();
        let length = text.chars().count();

        Self {
            chunk_id: Uuid::new_v4(),
            text,
            chunk_type,
            page_number,
            position_in_doc,
            section_label: section_label.into(),
            metadata: ChunkMetadata {
                length,
                header: header.map(|h| h.to_string()),
            },
        }
    }
}
