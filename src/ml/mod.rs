// ============================================================
// Layer 5 — ML / Model Layer (candle)
// ============================================================
// All candle and tokenizers code lives in this layer. Other
// layers only see the `Generator` trait from Layer 3.
//
//   catalog.rs      — the supported question-generation models
//   prompt.rs       — prompt templates and per-language checks
//                     on what the model returns
//   t5_generator.rs — loads a T5 checkpoint and decodes
//                     candidate questions for one prompt

/// Supported models and the default
pub mod catalog;

/// Prompt building and output validation
pub mod prompt;

/// candle T5 encoder-decoder behind the Generator trait
pub mod t5_generator;
