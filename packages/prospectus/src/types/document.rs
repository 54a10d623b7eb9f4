//! Input contract - the parsed document handed over by the upstream parser.
//!
//! The library consumes these read-only; producing them (PDF parsing, table
//! extraction) is an external collaborator's concern.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of a parsed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPage {
    /// 1-based page number
    pub page_number: u32,

    /// Extracted page text (layout-flattened)
    pub text: String,

    /// Structured tables: each table is a list of rows, each row a list of
    /// possibly-empty cell strings
    #[serde(default)]
    pub tables: Vec<Vec<Vec<String>>>,
}

impl ParsedPage {
    /// Create a page with text and no tables.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
            tables: Vec::new(),
        }
    }

    /// Attach a structured table.
    pub fn with_table(mut self, rows: Vec<Vec<String>>) -> Self {
        self.tables.push(rows);
        self
    }
}

/// A parsed multi-page document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub total_pages: u32,
    pub pages: Vec<ParsedPage>,

    /// Parser-provided document metadata (title, producer, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ParsedDocument {
    /// Create a document from its pages; `total_pages` tracks the page list.
    pub fn new(pages: Vec<ParsedPage>) -> Self {
        Self {
            total_pages: pages.len() as u32,
            pages,
            metadata: HashMap::new(),
        }
    }

    /// A document with no pages.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Text of all pages joined, each prefixed with its page number.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| format!("Page {}: {}", p.page_number, p.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
