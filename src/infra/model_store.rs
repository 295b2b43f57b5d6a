// ============================================================
// Layer 6 — Model Store
// ============================================================
// Locates the files a question-generation model needs:
//
//   config.json        → model architecture
//   tokenizer.json     → vocabulary (falls back to the catalog's
//                        tokenizer repo when the model repo has none)
//   model.safetensors  → weights (falls back to pytorch_model.bin)
//
// Files come from a local directory when one is given, otherwise
// from the Hugging Face hub, cached under the settings' cache dir.

use std::path::{Path, PathBuf};

use hf_hub::api::sync::{Api, ApiBuilder};

use crate::domain::error::{QgenError, QgenResult};
use crate::ml::catalog::ModelSpec;

const CONFIG_FILE:      &str = "config.json";
const TOKENIZER_FILE:   &str = "tokenizer.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE:     &str = "pytorch_model.bin";

/// Weight file and its on-disk format
#[derive(Debug, Clone, PartialEq)]
pub enum WeightsFile {
    SafeTensors(PathBuf),
    PyTorch(PathBuf),
}

/// Resolved paths for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub config:    PathBuf,
    pub tokenizer: PathBuf,
    pub weights:   WeightsFile,
}

pub struct ModelStore {
    cache_dir: PathBuf,
    local_dir: Option<PathBuf>,
}

impl ModelStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), local_dir: None }
    }

    /// Load from `dir` instead of the hub
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    pub fn resolve(&self, spec: &ModelSpec) -> QgenResult<ModelFiles> {
        let unavailable = |reason: String| QgenError::ModelUnavailable {
            model: spec.id.to_string(),
            reason,
        };

        match &self.local_dir {
            Some(dir) => {
                tracing::info!("Loading model files from '{}'", dir.display());
                resolve_local(dir).map_err(unavailable)
            }
            None => {
                tracing::info!(
                    "Fetching model '{}' (cache: '{}')",
                    spec.id,
                    self.cache_dir.display()
                );
                self.resolve_hub(spec).map_err(unavailable)
            }
        }
    }

    fn resolve_hub(&self, spec: &ModelSpec) -> Result<ModelFiles, String> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| format!("cache dir '{}': {e}", self.cache_dir.display()))?;
        let api = ApiBuilder::new()
            .with_cache_dir(self.cache_dir.clone())
            .build()
            .map_err(|e| format!("hub client: {e}"))?;
        let repo = api.model(spec.id.to_string());

        let config = repo.get(CONFIG_FILE).map_err(|e| format!("{CONFIG_FILE}: {e}"))?;

        let tokenizer = match repo.get(TOKENIZER_FILE) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(
                    "No {TOKENIZER_FILE} in '{}' ({e}), using '{}'",
                    spec.id,
                    spec.tokenizer_repo
                );
                fetch_from(&api, spec.tokenizer_repo, TOKENIZER_FILE)?
            }
        };

        let weights = match repo.get(SAFETENSORS_FILE) {
            Ok(path) => WeightsFile::SafeTensors(path),
            Err(e) => {
                tracing::debug!("No {SAFETENSORS_FILE} in '{}' ({e}), trying {PYTORCH_FILE}", spec.id);
                let path = repo.get(PYTORCH_FILE).map_err(|e| format!("{PYTORCH_FILE}: {e}"))?;
                WeightsFile::PyTorch(path)
            }
        };

        Ok(ModelFiles { config, tokenizer, weights })
    }
}

fn fetch_from(api: &Api, repo_id: &str, file: &str) -> Result<PathBuf, String> {
    api.model(repo_id.to_string())
        .get(file)
        .map_err(|e| format!("{file} from '{repo_id}': {e}"))
}

/// Find model files inside a local directory
fn resolve_local(dir: &Path) -> Result<ModelFiles, String> {
    if !dir.is_dir() {
        return Err(format!("'{}' is not a directory", dir.display()));
    }

    let required = |name: &str| -> Result<PathBuf, String> {
        let path = dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(format!("missing {name} in '{}'", dir.display()))
        }
    };

    let config    = required(CONFIG_FILE)?;
    let tokenizer = required(TOKENIZER_FILE)?;
    let weights   = match required(SAFETENSORS_FILE) {
        Ok(path) => WeightsFile::SafeTensors(path),
        Err(_)   => WeightsFile::PyTorch(required(PYTORCH_FILE)?),
    };

    Ok(ModelFiles { config, tokenizer, weights })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::catalog;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"{}").unwrap();
    }

    #[test]
    fn test_local_dir_prefers_safetensors() {
        let dir = tempfile::tempdir().unwrap();
        for f in [CONFIG_FILE, TOKENIZER_FILE, SAFETENSORS_FILE, PYTORCH_FILE] {
            touch(dir.path(), f);
        }
        let files = resolve_local(dir.path()).unwrap();
        assert_eq!(files.weights, WeightsFile::SafeTensors(dir.path().join(SAFETENSORS_FILE)));
    }

    #[test]
    fn test_local_dir_falls_back_to_pytorch_weights() {
        let dir = tempfile::tempdir().unwrap();
        for f in [CONFIG_FILE, TOKENIZER_FILE, PYTORCH_FILE] {
            touch(dir.path(), f);
        }
        let files = resolve_local(dir.path()).unwrap();
        assert_eq!(files.weights, WeightsFile::PyTorch(dir.path().join(PYTORCH_FILE)));
    }

    #[test]
    fn test_unusable_cache_dir_is_reported() {
        let dir     = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        touch(dir.path(), "not-a-dir");

        let store = ModelStore::new(blocker.join("models"));
        match store.resolve(catalog::default_model()).unwrap_err() {
            QgenError::ModelUnavailable { reason, .. } => assert!(reason.starts_with("cache dir")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_files_make_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE);
        let store = ModelStore::new(dir.path()).with_local_dir(dir.path());
        let err = store.resolve(catalog::default_model()).unwrap_err();
        match err {
            QgenError::ModelUnavailable { model, reason } => {
                assert_eq!(model, catalog::DEFAULT_MODEL);
                assert!(reason.contains(TOKENIZER_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
