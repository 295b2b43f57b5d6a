// ============================================================
// Layer 4 — Document Extractor
// ============================================================
// Turns a PDF on disk into one cleaned full-text buffer:
//
//   path ─▶ backend.open ─▶ page 1..N ─▶ Preprocessor ─▶ "\n\n".join
//                                 │
//                                 └─ every 10 pages: memory.reclaim(false)
//
// The document handle lives only inside one call and is dropped
// on every exit path. `check` and `extract_document` read the
// metadata from the handle they already hold, so a run parses the
// file once to validate it and once to read it. Stand-alone
// metadata reads are best-effort: they log and degrade instead
// of failing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::data::preprocessor::Preprocessor;
use crate::domain::document::DocumentMetadata;
use crate::domain::error::{BackendError, QgenError, QgenResult};
use crate::domain::traits::{DocumentBackend, DocumentHandle};
use crate::infra::memory::MemoryMonitor;

const RECLAIM_EVERY_PAGES: usize = 10;
const PAGE_SEPARATOR:      &str  = "\n\n";
const DOCUMENT_EXTENSION:  &str  = "pdf";

pub struct DocumentExtractor {
    backend:      Arc<dyn DocumentBackend>,
    memory:       Arc<MemoryMonitor>,
    preprocessor: Preprocessor,
}

impl DocumentExtractor {
    pub fn new(backend: Arc<dyn DocumentBackend>, memory: Arc<MemoryMonitor>) -> Self {
        Self { backend, memory, preprocessor: Preprocessor::new() }
    }

    /// Extract and clean the text of every page, pages separated by a blank line.
    ///
    /// Pages whose raw text is blank are skipped. A page that fails to
    /// extract is logged and skipped; if every page fails the last
    /// failure is returned as an extraction error.
    pub fn extract_full_text(&self, path: &Path) -> QgenResult<String> {
        let handle = self.open_existing(path)?;
        self.read_text(handle.as_ref(), path)
    }

    /// Metadata and full text read through a single open of the file
    pub fn extract_document(&self, path: &Path) -> QgenResult<(DocumentMetadata, String)> {
        let handle   = self.open_existing(path)?;
        let metadata = read_metadata(handle.as_ref(), path);
        let text     = self.read_text(handle.as_ref(), path)?;
        Ok((metadata, text))
    }

    fn open_existing(&self, path: &Path) -> QgenResult<Box<dyn DocumentHandle>> {
        if !path.exists() {
            return Err(QgenError::NotFound { path: path.to_path_buf() });
        }
        self.backend.open(path).map_err(|source| QgenError::Extraction {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_text(&self, handle: &dyn DocumentHandle, path: &Path) -> QgenResult<String> {
        let total = handle.page_count();
        let name  = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        tracing::info!("Processing PDF: {} ({} pages)", name, total);

        let mut pages:    Vec<String>          = Vec::new();
        let mut failures: usize                = 0;
        let mut last_err: Option<BackendError> = None;

        for index in 0..total {
            match handle.page_text(index) {
                Ok(raw) if !raw.trim().is_empty() => pages.push(self.preprocessor.clean_page(&raw)),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Skipping page {}/{}: {}", index + 1, total, e);
                    failures += 1;
                    last_err = Some(e);
                }
            }

            if (index + 1) % RECLAIM_EVERY_PAGES == 0 {
                self.memory.reclaim(false);
            }
            tracing::debug!("Processed page {}/{}", index + 1, total);
        }

        if total > 0 && failures == total {
            if let Some(source) = last_err {
                return Err(QgenError::Extraction { path: path.to_path_buf(), source });
            }
        }

        let full_text = pages.join(PAGE_SEPARATOR);
        tracing::info!("Extracted text: {} characters", full_text.chars().count());
        Ok(full_text)
    }

    /// Best-effort metadata; any failure yields the empty metadata.
    pub fn metadata(&self, path: &Path) -> DocumentMetadata {
        let handle = match self.backend.open(path) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Cannot read metadata of '{}': {}", path.display(), e);
                return DocumentMetadata::default();
            }
        };
        read_metadata(handle.as_ref(), path)
    }

    /// True iff the file exists, is a .pdf, opens and has at least one page.
    pub fn validate(&self, path: &Path) -> bool {
        self.check(path).map_err(|e| tracing::warn!("{e}")).is_ok()
    }

    /// `validate` with the reason for a rejection. An accepted
    /// document's metadata comes back with it.
    pub fn check(&self, path: &Path) -> QgenResult<DocumentMetadata> {
        let invalid = |reason: &str| QgenError::InvalidDocument {
            path:   path.to_path_buf(),
            reason: reason.to_string(),
        };

        if !path.exists() {
            return Err(QgenError::NotFound { path: path.to_path_buf() });
        }
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
        if !is_pdf {
            return Err(invalid("not a .pdf file"));
        }

        let handle = self.backend.open(path).map_err(|source| QgenError::Extraction {
            path: path.to_path_buf(),
            source,
        })?;
        if handle.page_count() == 0 {
            return Err(invalid("document has no pages"));
        }

        let first_page_blank = handle.page_text(0).map(|t| t.trim().is_empty()).unwrap_or(true);
        if first_page_blank {
            tracing::warn!(
                "First page of '{}' has no text; the PDF may contain only images",
                path.display()
            );
        }
        Ok(read_metadata(handle.as_ref(), path))
    }
}

fn read_metadata(handle: &dyn DocumentHandle, path: &Path) -> DocumentMetadata {
    let mut info: BTreeMap<String, String> = handle.metadata_map();
    let file_size_mb = fs::metadata(path)
        .map(|m| m.len() as f64 / 1024.0 / 1024.0)
        .ok();

    DocumentMetadata {
        title:        info.remove("Title"),
        author:       info.remove("Author"),
        subject:      info.remove("Subject"),
        page_count:   Some(handle.page_count()),
        file_size_mb,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infra::memory::tests::{calm_monitor, counting_monitor};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory backend. Each page is either its text or an error message.
    /// `opens` counts calls to `open`, shared between clones.
    #[derive(Clone, Default)]
    pub(crate) struct FakeBackend {
        pub pages:     Vec<Result<String, String>>,
        pub info:      BTreeMap<String, String>,
        pub fail_open: bool,
        pub opens:     Arc<AtomicUsize>,
    }

    impl FakeBackend {
        pub(crate) fn with_pages(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| Ok(p.to_string())).collect(),
                ..Default::default()
            }
        }
    }

    impl DocumentBackend for FakeBackend {
        fn open(&self, _path: &Path) -> Result<Box<dyn DocumentHandle>, BackendError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                return Err("corrupt xref table".into());
            }
            Ok(Box::new(self.clone()))
        }
    }

    impl DocumentHandle for FakeBackend {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, index: usize) -> Result<String, BackendError> {
            match &self.pages[index] {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(msg.clone().into()),
            }
        }

        fn metadata_map(&self) -> BTreeMap<String, String> {
            self.info.clone()
        }
    }

    /// Empty file on disk so existence checks pass
    pub(crate) fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"%PDF-1.5").unwrap();
        path
    }

    fn extractor(backend: FakeBackend) -> DocumentExtractor {
        DocumentExtractor::new(Arc::new(backend), Arc::new(calm_monitor()))
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = extractor(FakeBackend::default())
            .extract_full_text(Path::new("/no/such/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, QgenError::NotFound { .. }));
    }

    #[test]
    fn test_open_failure_is_extraction_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "bad.pdf");
        let backend = FakeBackend { fail_open: true, ..Default::default() };
        let err = extractor(backend).extract_full_text(&path).unwrap_err();
        assert!(matches!(err, QgenError::Extraction { .. }));
    }

    #[test]
    fn test_three_pages_joined_by_blank_lines() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "three.pdf");
        let page1 = "Photosynthesis converts light into energy";
        let page3 = "Chlorophyll absorbs mostly blue and red light wavelengths";
        let text = extractor(FakeBackend::with_pages(&[page1, "p. 2", page3]))
            .extract_full_text(&path)
            .unwrap();

        let parts: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(parts, vec![page1, "", page3]);
        assert_eq!(text.split_whitespace().count(), 13);
    }

    #[test]
    fn test_blank_pages_are_skipped_and_controls_stripped() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "ctrl.pdf");
        let text = extractor(FakeBackend::with_pages(&["   \n ", "Mito\u{0002}chondria make ATP\u{0007}"]))
            .extract_full_text(&path)
            .unwrap();
        assert_eq!(text, "Mitochondria make ATP");
    }

    #[test]
    fn test_failed_page_is_skipped() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "partial.pdf");
        let backend = FakeBackend {
            pages: vec![Err("bad font".into()), Ok("Readable second page here".into())],
            ..Default::default()
        };
        assert_eq!(extractor(backend).extract_full_text(&path).unwrap(), "Readable second page here");
    }

    #[test]
    fn test_every_page_failing_is_extraction_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "dead.pdf");
        let backend = FakeBackend {
            pages: vec![Err("bad font".into()), Err("bad stream".into())],
            ..Default::default()
        };
        let err = extractor(backend).extract_full_text(&path).unwrap_err();
        assert!(err.to_string().contains("bad stream"));
    }

    #[test]
    fn test_reclaim_checked_every_ten_pages() {
        let dir   = tempfile::tempdir().unwrap();
        let path  = touch(dir.path(), "long.pdf");
        let pages = vec!["A page with enough text on it"; 25];
        let (monitor, reads) = counting_monitor();
        let extractor = DocumentExtractor::new(Arc::new(FakeBackend::with_pages(&pages)), Arc::new(monitor));

        extractor.extract_full_text(&path).unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_metadata_is_best_effort() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "meta.pdf");
        let mut backend = FakeBackend::with_pages(&["one", "two"]);
        backend.info.insert("Title".into(), "Genetics".into());

        let meta = extractor(backend).metadata(&path);
        assert_eq!(meta.title.as_deref(), Some("Genetics"));
        assert_eq!(meta.page_count, Some(2));
        assert!(meta.file_size_mb.is_some());

        let broken = FakeBackend { fail_open: true, ..Default::default() };
        assert!(extractor(broken).metadata(&path).is_empty());
    }

    #[test]
    fn test_check_returns_metadata_from_one_open() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "check.pdf");
        let mut backend = FakeBackend::with_pages(&["Some readable text", "More text"]);
        backend.info.insert("Author".into(), "Mendel".into());
        let opens = Arc::clone(&backend.opens);

        let meta = extractor(backend).check(&path).unwrap();
        assert_eq!(meta.author.as_deref(), Some("Mendel"));
        assert_eq!(meta.page_count, Some(2));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extract_document_opens_once() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "once.pdf");
        let mut backend = FakeBackend::with_pages(&["Genes are passed from parents to offspring"]);
        backend.info.insert("Title".into(), "Heredity".into());
        let opens = Arc::clone(&backend.opens);

        let (meta, text) = extractor(backend).extract_document(&path).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Heredity"));
        assert_eq!(text, "Genes are passed from parents to offspring");
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = touch(dir.path(), "ok.PDF");
        let txt = touch(dir.path(), "notes.txt");

        assert!(extractor(FakeBackend::with_pages(&["text"])).validate(&pdf));
        // image-only first page only warns
        assert!(extractor(FakeBackend::with_pages(&[""])).validate(&pdf));
        assert!(!extractor(FakeBackend::with_pages(&["text"])).validate(&txt));
        assert!(!extractor(FakeBackend::default()).validate(&pdf));
        assert!(!extractor(FakeBackend::with_pages(&["text"])).validate(&dir.path().join("gone.pdf")));
        let broken = FakeBackend { fail_open: true, ..Default::default() };
        assert!(!extractor(broken).validate(&pdf));
    }
}
