// ============================================================
// Layer 4 — Text Chunker
// ============================================================
// Splits a document's full text into overlapping word windows,
// one window per `next()` call.
//
// Example with window=5, overlap=2:
//   Document: "A B C D E F G H I J"
//   Chunk 1:  "A B C D E"          (words 0-4)
//   Chunk 2:  "D E F G H"          (words 3-7, shares D E)
//   Chunk 3:  "G H I J"            (words 6-9, last chunk)
//
// The window size comes from the memory monitor's recommendation
// for the configured base, read once per `chunks()` call. The stride
// is window - overlap; the overlap is clamped below the window so
// the cursor always advances. Windows whose trimmed text is 50
// characters or shorter are skipped.

use std::ops::Range;
use std::sync::Arc;

use crate::infra::memory::MemoryMonitor;

const MIN_CHUNK_CHARS_EXCLUSIVE: usize = 50;

pub struct Chunker {
    /// Target number of words per chunk before memory adaptation
    base_size: usize,
    /// Number of words shared between adjacent chunks
    overlap:   usize,
    memory:    Arc<MemoryMonitor>,
}

impl Chunker {
    pub fn new(base_size: usize, overlap: usize, memory: Arc<MemoryMonitor>) -> Self {
        Self { base_size, overlap, memory }
    }

    /// Lazily split `text` into chunks. The cursor owns the text.
    pub fn chunks(&self, text: impl Into<String>) -> Chunks {
        let text   = text.into();
        let window = self.memory.recommended_chunk_size(self.base_size);

        let overlap = if self.overlap >= window {
            tracing::warn!(
                "Overlap {} does not fit a {}-word window; using {}",
                self.overlap,
                window,
                window - 1
            );
            window - 1
        } else {
            self.overlap
        };

        let words = word_spans(&text);
        tracing::info!(
            "Splitting text into chunks (size: {}, overlap: {}, total words: {})",
            window,
            overlap,
            words.len()
        );

        Chunks { text, words, position: 0, window, overlap, done: false }
    }
}

/// Cursor over one text's word windows. Finite and not restartable.
pub struct Chunks {
    text:     String,
    /// Byte range of every word in `text`
    words:    Vec<Range<usize>>,
    position: usize,
    window:   usize,
    overlap:  usize,
    done:     bool,
}

impl Chunks {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn next_window(&mut self) -> Option<String> {
        if self.done || self.position >= self.words.len() {
            self.done = true;
            return None;
        }

        let start = self.position;
        let end   = (start + self.window).min(self.words.len());
        let chunk = self.words[start..end]
            .iter()
            .map(|span| &self.text[span.clone()])
            .collect::<Vec<_>>()
            .join(" ");

        if end == self.words.len() {
            self.done = true;
        } else {
            self.position = end - self.overlap;
        }
        Some(chunk)
    }
}

impl Iterator for Chunks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(chunk) = self.next_window() {
            if chunk.trim().chars().count() > MIN_CHUNK_CHARS_EXCLUSIVE {
                return Some(chunk);
            }
            tracing::debug!("Dropping short chunk ({} chars)", chunk.chars().count());
        }
        None
    }
}

fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}
