// ============================================================
// Layer 5 — Model Catalog
// ============================================================
// The question-generation models this tool knows how to drive.
// Each entry fixes the prompt language, which in turn decides
// the prompt template and the output validation rules.

use serde::Serialize;

use crate::ml::prompt::Language;

/// Model used when none (or an unknown one) is requested
pub const DEFAULT_MODEL: &str = "mrm8488/t5-base-finetuned-question-generation-ap";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelSpec {
    pub id:             &'static str,
    pub kind:           &'static str,
    pub size_mb:        u32,
    pub description:    &'static str,
    pub language:       Language,
    /// Repo to take `tokenizer.json` from when the model repo lacks one
    pub tokenizer_repo: &'static str,
}

pub const SUPPORTED_MODELS: &[ModelSpec] = &[
    ModelSpec {
        id:             "iarfmoose/t5-base-question-generator",
        kind:           "qg",
        size_mb:        250,
        description:    "T5-base trained for English question generation",
        language:       Language::English,
        tokenizer_repo: "t5-base",
    },
    ModelSpec {
        id:             "t5-small",
        kind:           "qg",
        size_mb:        200,
        description:    "T5-small for question generation (less accurate)",
        language:       Language::English,
        tokenizer_repo: "t5-small",
    },
    ModelSpec {
        id:             DEFAULT_MODEL,
        kind:           "qg",
        size_mb:        250,
        description:    "T5-base fine-tuned for Spanish question generation",
        language:       Language::Spanish,
        tokenizer_repo: "t5-base",
    },
];

/// Look a model up by exact id
pub fn find(id: &str) -> Option<&'static ModelSpec> {
    SUPPORTED_MODELS.iter().find(|m| m.id == id)
}

pub fn default_model() -> &'static ModelSpec {
    // DEFAULT_MODEL is one of the entries above
    find(DEFAULT_MODEL).unwrap_or(&SUPPORTED_MODELS[SUPPORTED_MODELS.len() - 1])
}

/// Resolve a requested model name; unknown or missing names fall back
/// to the default model.
pub fn resolve(requested: Option<&str>) -> &'static ModelSpec {
    match requested {
        Some(id) => find(id).unwrap_or_else(|| {
            tracing::warn!("Unknown model '{id}', using '{DEFAULT_MODEL}'");
            default_model()
        }),
        None => default_model(),
    }
}

/// `{name, type, size_mb, description}` summary for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name:        String,
    #[serde(rename = "type")]
    pub kind:        String,
    pub size_mb:     String,
    pub description: String,
}

impl From<&ModelSpec> for ModelInfo {
    fn from(spec: &ModelSpec) -> Self {
        Self {
            name:        spec.id.to_string(),
            kind:        spec.kind.to_string(),
            size_mb:     spec.size_mb.to_string(),
            description: spec.description.to_string(),
        }
    }
}
