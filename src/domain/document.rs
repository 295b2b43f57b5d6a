// ============================================================
// Layer 3 — Document Domain Types
// ============================================================
// `DocumentMetadata` is advisory information about a PDF.
// `TextChunk` is one accepted word-window of a document's text,
// as handed out by the streaming pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Best-effort metadata read from a document.
///
/// Every field is optional: a document that cannot be inspected
/// yields `DocumentMetadata::default()`, the "empty mapping".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title:        Option<String>,
    pub author:       Option<String>,
    pub subject:      Option<String>,
    pub page_count:   Option<usize>,
    pub file_size_mb: Option<f64>,
}

impl DocumentMetadata {
    /// True when nothing at all could be read
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.page_count.is_none()
            && self.file_size_mb.is_none()
    }

    /// Title for display, falling back to the given name
    pub fn display_title<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(fallback)
    }
}

/// One chunk of document text, in chunk order.
///
/// The metadata is shared between all chunks of a document;
/// a chunk never refers back to the document itself.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Ordinal position, starting at 0
    pub index:        usize,
    pub text:         String,
    /// Length of `text` in characters
    pub length_chars: usize,
    pub metadata:     Arc<DocumentMetadata>,
}

impl TextChunk {
    pub fn new(index: usize, text: String, metadata: Arc<DocumentMetadata>) -> Self {
        let length_chars = text.chars().count();
        Self { index, text, length_chars, metadata }
    }
}
