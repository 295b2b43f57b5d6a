// ============================================================
// Layer 4 — Streaming Pipeline
// ============================================================
// Composes metadata → full-text extraction → chunking into one
// pull-based stream of `TextChunk` records.
//
//   DocumentPipeline::stream(path)
//       │  metadata + full text, eagerly, from one open of the file
//       ▼
//   DocumentStream ── next() ──▶ TextChunk { index, text, length, metadata }
//                    │
//                    └─ after every 5th record: memory.reclaim(false)
//
// The caller may stop pulling at any time; dropping the stream
// releases the full-text buffer it owns.

use std::path::Path;
use std::sync::Arc;

use crate::data::chunker::{Chunker, Chunks};
use crate::data::extractor::DocumentExtractor;
use crate::domain::document::{DocumentMetadata, TextChunk};
use crate::domain::error::QgenResult;
use crate::infra::memory::MemoryMonitor;

const RECLAIM_EVERY_CHUNKS: usize = 5;

pub struct DocumentPipeline {
    extractor: DocumentExtractor,
    chunker:   Chunker,
    memory:    Arc<MemoryMonitor>,
}

impl DocumentPipeline {
    pub fn new(extractor: DocumentExtractor, chunker: Chunker, memory: Arc<MemoryMonitor>) -> Self {
        Self { extractor, chunker, memory }
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    /// Extract the whole document, then hand out its chunks one at a time.
    pub fn stream(&self, path: &Path) -> QgenResult<DocumentStream> {
        let (metadata, full_text) = self.extractor.extract_document(path)?;

        Ok(DocumentStream {
            chunks:      self.chunker.chunks(full_text),
            metadata:    Arc::new(metadata),
            memory:      Arc::clone(&self.memory),
            yielded:     0,
            reclaim_due: false,
        })
    }
}

pub struct DocumentStream {
    chunks:      Chunks,
    metadata:    Arc<DocumentMetadata>,
    memory:      Arc<MemoryMonitor>,
    yielded:     usize,
    /// Set once a 5th record has been handed out; honoured on the next pull
    reclaim_due: bool,
}

impl DocumentStream {
    pub fn metadata(&self) -> &Arc<DocumentMetadata> {
        &self.metadata
    }
}

impl Iterator for DocumentStream {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        if self.reclaim_due {
            self.reclaim_due = false;
            self.memory.reclaim(false);
        }

        let text  = self.chunks.next()?;
        let chunk = TextChunk::new(self.yielded, text, Arc::clone(&self.metadata));
        tracing::debug!("Yielding chunk {} ({} chars)", chunk.index, chunk.length_chars);

        self.yielded += 1;
        self.reclaim_due = self.yielded % RECLAIM_EVERY_CHUNKS == 0;
        Some(chunk)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::extractor::tests::{touch, FakeBackend};
    use crate::domain::error::QgenError;
    use crate::infra::memory::tests::{calm_monitor, counting_monitor};
    use std::sync::atomic::Ordering;

    fn pipeline(backend: FakeBackend, memory: Arc<MemoryMonitor>, base: usize, overlap: usize) -> DocumentPipeline {
        DocumentPipeline::new(
            DocumentExtractor::new(Arc::new(backend), Arc::clone(&memory)),
            Chunker::new(base, overlap, Arc::clone(&memory)),
            memory,
        )
    }

    fn long_page(words: usize) -> String {
        (0..words).map(|i| format!("term{i:05}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_records_are_indexed_in_order_with_shared_metadata() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "doc.pdf");
        let mut backend = FakeBackend::with_pages(&[long_page(100).as_str()]);
        backend.info.insert("Title".into(), "Ecology".into());

        let records: Vec<TextChunk> = pipeline(backend, Arc::new(calm_monitor()), 30, 5)
            .stream(&path)
            .unwrap()
            .collect();

        assert_eq!(records.len(), 4);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.index, i);
            assert_eq!(r.length_chars, r.text.chars().count());
            assert_eq!(r.metadata.title.as_deref(), Some("Ecology"));
        }
        assert!(Arc::ptr_eq(&records[0].metadata, &records[3].metadata));
    }

    #[test]
    fn test_stream_opens_the_document_once() {
        let dir     = tempfile::tempdir().unwrap();
        let path    = touch(dir.path(), "single.pdf");
        let backend = FakeBackend::with_pages(&[long_page(80).as_str()]);
        let opens   = Arc::clone(&backend.opens);

        let count = pipeline(backend, Arc::new(calm_monitor()), 30, 5)
            .stream(&path)
            .unwrap()
            .count();
        assert!(count > 0);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_twenty_word_document_is_one_chunk() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "short.pdf");
        let backend = FakeBackend::with_pages(&[
            "Rivers carry sediment down to the sea",
            "iv",
            "Deltas form where rivers slow down and drop their sediment load over time",
        ]);

        let records: Vec<TextChunk> = pipeline(backend, Arc::new(calm_monitor()), 512, 50)
            .stream(&path)
            .unwrap()
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text.split_whitespace().count(), 20);
    }

    #[test]
    fn test_reclaim_after_every_fifth_record() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "many.pdf");
        let (monitor, reads) = counting_monitor();
        let memory = Arc::new(monitor);

        // 12 disjoint windows of 10 words
        let mut stream = pipeline(FakeBackend::with_pages(&[long_page(120).as_str()]), memory, 10, 0)
            .stream(&path)
            .unwrap();
        let base = reads.load(Ordering::SeqCst);

        for _ in 0..5 {
            stream.next().unwrap();
        }
        assert_eq!(reads.load(Ordering::SeqCst), base);
        stream.next().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), base + 1);

        assert_eq!(stream.count(), 6);
        assert_eq!(reads.load(Ordering::SeqCst), base + 2);
    }

    #[test]
    fn test_missing_document_fails_before_streaming() {
        let err = pipeline(FakeBackend::default(), Arc::new(calm_monitor()), 512, 50)
            .stream(Path::new("/missing/doc.pdf"))
            .err()
            .unwrap();
        assert!(matches!(err, QgenError::NotFound { .. }));
    }
}
