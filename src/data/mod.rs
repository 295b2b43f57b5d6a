// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer takes a PDF on disk to a stream of text chunks.
//
// The pipeline flows in this order:
//
//   .pdf file
//       │
//       ▼
//   LopdfBackend      → opens the file, page text + info dictionary
//       │
//       ▼
//   Preprocessor      → cleans each page (controls, whitespace, near-empty pages)
//       │
//       ▼
//   DocumentExtractor → joins cleaned pages into one full text
//       │
//       ▼
//   Chunker           → overlapping word windows, sized by memory
//       │
//       ▼
//   DocumentStream    → one TextChunk per pull
//
// Sentence splitting for prompts and exam answers also lives here.

/// Opens PDF files with lopdf
pub mod loader;

/// Cleans the raw text of one page
pub mod preprocessor;

/// Full-text extraction, metadata and validation
pub mod extractor;

/// Memory-sized overlapping word windows
pub mod chunker;

/// Pull-based stream of chunk records
pub mod pipeline;

/// Sentence splitting over chunk text
pub mod sentences;
