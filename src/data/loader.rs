// ============================================================
// Layer 4 — PDF Loader (lopdf)
// ============================================================
// Opens PDF files with the lopdf crate and exposes them through
// the `DocumentBackend` / `DocumentHandle` traits from Layer 3.
//
// How a PDF is laid out for our purposes:
//   trailer
//     ├── Root → Catalog → Pages → Kids → Page (one per page)
//     └── Info → { Title, Author, Subject, ... }
//
// `Document::get_pages()` numbers pages from 1; the handle maps
// zero-based indices onto those numbers. The whole file is parsed
// on open, and dropping the handle frees it.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, Object};

use crate::domain::error::BackendError;
use crate::domain::traits::{DocumentBackend, DocumentHandle};

/// Information-dictionary keys surfaced as metadata
const INFO_KEYS: [&str; 3] = ["Title", "Author", "Subject"];

pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for LopdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, BackendError> {
        let doc   = Document::load(path)?;
        let pages = doc.get_pages().keys().copied().collect();

        tracing::debug!("Opened '{}' with lopdf", path.display());
        Ok(Box::new(LopdfHandle { doc, pages }))
    }
}

struct LopdfHandle {
    doc:   Document,
    /// 1-based page numbers in document order
    pages: Vec<u32>,
}

impl DocumentHandle for LopdfHandle {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page_no = self
            .pages
            .get(index)
            .ok_or_else(|| format!("page index {index} out of range"))?;
        Ok(self.doc.extract_text(&[*page_no])?)
    }

    fn metadata_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        let info = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_object(*id).and_then(Object::as_dict),
            Ok(obj) => obj.as_dict(),
            Err(e) => Err(e),
        };
        let Ok(info) = info else {
            return map;
        };

        for key in INFO_KEYS {
            if let Ok(Object::String(bytes, _)) = info.get(key.as_bytes()) {
                let value = decode_text_string(bytes);
                if !value.trim().is_empty() {
                    map.insert(key.to_string(), value);
                }
            }
        }
        map
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM,
/// otherwise UTF-8, falling back to one char per byte.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s)  => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
