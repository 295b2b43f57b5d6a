// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Fatal errors (`QgenError`) unwind to the CLI and end the current
// operation. Soft errors (`GenerationError`, `MemoryReadError`) are
// absorbed by the component that sees them and only show up in logs.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause coming out of an external collaborator (PDF library, model runtime)
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum QgenError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot extract text from {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("not a usable PDF: {} ({reason})", path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("model '{model}' could not be loaded: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("cannot write report to {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type QgenResult<T> = Result<T, QgenError>;

/// A single prompt failed to produce output. The sentence is skipped.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("tokenisation failed: {0}")]
    Tokenize(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("generator state unavailable: {0}")]
    Unavailable(String),
}

/// Memory could not be sampled. The monitor reports a zeroed snapshot instead.
#[derive(Debug, Error)]
#[error("memory read failed: {0}")]
pub struct MemoryReadError(pub String);
