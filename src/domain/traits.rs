// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The three external collaborators, seen from the core:
//   - DocumentBackend / DocumentHandle → the PDF library
//   - Generator                        → the question-generation model
//   - MemoryProbe                      → the OS memory counters
//
// Production implementations live in data/loader.rs,
// ml/t5_generator.rs and infra/memory.rs; tests plug in fakes.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::error::{BackendError, GenerationError, MemoryReadError};
use crate::domain::memory::MemorySnapshot;

// ─── DocumentBackend ──────────────────────────────────────────────────────────
/// Opens documents. Opening fails if the file is unreadable or unparseable.
pub trait DocumentBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, BackendError>;
}

/// An open document. Dropping the handle releases it, so every exit
/// path of the code that opened it closes it.
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Raw text of the page at zero-based `index`
    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Document information dictionary, keys as found in the file
    /// (`Title`, `Author`, `Subject`, ...)
    fn metadata_map(&self) -> BTreeMap<String, String>;
}

// ─── Generator ────────────────────────────────────────────────────────────────
/// Text in, candidate strings out. Each call may fail on its own;
/// callers treat a failure as "this prompt produced nothing".
pub trait Generator: Send {
    fn generate(&self, prompt: &str) -> Result<Vec<String>, GenerationError>;

    /// Identifier of the model behind this generator
    fn model_id(&self) -> &str;
}

// ─── MemoryProbe ──────────────────────────────────────────────────────────────
/// Reads raw memory counters.
pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> Result<MemorySnapshot, MemoryReadError>;
}
