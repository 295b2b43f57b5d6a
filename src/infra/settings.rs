// ============================================================
// Layer 6 — Process Settings
// ============================================================
// Process-wide, read-mostly configuration. Built once from the
// CLI flags (which also read QGEN_* environment variables) and
// passed by value into whoever needs it.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::infra::memory::DEFAULT_MAX_MEMORY_GB;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_OVERLAP:    usize = 50;
pub const DEFAULT_MODEL_CACHE: &str = "./models";

/// Threads given to the inference runtime unless the user chose otherwise
const INFERENCE_THREADS: &str = "2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Resident memory ceiling for this process, in GB
    pub max_memory_gb:   f64,
    /// Where downloaded model files are cached
    pub model_cache_dir: PathBuf,
    /// Target chunk size in words before memory adaptation
    pub chunk_size:      usize,
    /// Words shared by consecutive chunks
    pub overlap:         usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_memory_gb:   DEFAULT_MAX_MEMORY_GB,
            model_cache_dir: PathBuf::from(DEFAULT_MODEL_CACHE),
            chunk_size:      DEFAULT_CHUNK_SIZE,
            overlap:         DEFAULT_OVERLAP,
        }
    }
}

impl Settings {
    /// Export the environment the model runtime reads.
    ///
    /// Must run before any worker thread is spawned: it writes
    /// process environment variables.
    pub fn apply_process_environment(&self) {
        set_if_unset("RAYON_NUM_THREADS", INFERENCE_THREADS);
        set_if_unset("HF_HOME", &self.model_cache_dir.to_string_lossy());
        env::set_var("TOKENIZERS_PARALLELISM", "false");

        tracing::debug!(
            "Environment ready: cache={}, ceiling={:.1}GB",
            self.model_cache_dir.display(),
            self.max_memory_gb
        );
    }
}

fn set_if_unset(key: &str, value: &str) {
    if env::var_os(key).is_none() {
        env::set_var(key, value);
    }
}
