// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and the global flags that become the
// process-wide `Settings`.
//
//   questions — generate questions from a PDF
//   exam      — interactive multiple-choice exam from a PDF
//   models    — list the supported models
//   memory    — print the current memory reading
//   inspect   — validate a PDF and show its metadata

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::infra::memory::DEFAULT_MAX_MEMORY_GB;
use crate::infra::settings::{Settings, DEFAULT_CHUNK_SIZE, DEFAULT_MODEL_CACHE, DEFAULT_OVERLAP};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate questions from a PDF
    Questions(QuestionsArgs),

    /// Build a multiple-choice exam from a PDF and take it in the terminal
    Exam(ExamArgs),

    /// List the supported question-generation models
    Models,

    /// Show current process and system memory
    Memory,

    /// Check whether a PDF can be processed and print its metadata
    Inspect(InspectArgs),
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Resident memory ceiling for this process, in GB
    #[arg(long, global = true, env = "QGEN_MAX_MEMORY_GB", default_value_t = DEFAULT_MAX_MEMORY_GB)]
    pub max_memory_gb: f64,

    /// Directory where model files are cached
    #[arg(long, global = true, env = "QGEN_MODEL_CACHE", default_value = DEFAULT_MODEL_CACHE)]
    pub model_cache: PathBuf,

    /// Words per chunk before memory adaptation
    #[arg(long, global = true, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Words shared between consecutive chunks
    #[arg(long, global = true, default_value_t = DEFAULT_OVERLAP)]
    pub overlap: usize,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// The application layer never sees clap types.
impl From<&GlobalArgs> for Settings {
    fn from(a: &GlobalArgs) -> Self {
        Settings {
            max_memory_gb:   a.max_memory_gb,
            model_cache_dir: a.model_cache.clone(),
            chunk_size:      a.chunk_size.max(1),
            overlap:         a.overlap,
        }
    }
}

/// Model selection shared by `questions` and `exam`
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model id; unknown ids fall back to the default model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Load model files from this directory instead of the hub
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Maximum tokens per generated question
    #[arg(long, default_value_t = 100)]
    pub max_length: usize,
}

#[derive(Args, Debug)]
pub struct QuestionsArgs {
    /// PDF to read
    #[arg(short, long)]
    pub file: PathBuf,

    /// Number of questions to generate
    #[arg(short = 'n', long, default_value_t = 10)]
    pub num_questions: usize,

    /// Save questions here (.json for JSON, anything else for text)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct ExamArgs {
    /// PDF to read
    #[arg(short, long)]
    pub file: PathBuf,

    /// Number of exam questions
    #[arg(short = 'n', long, default_value_t = 5)]
    pub num_questions: usize,

    /// Options per question (at least 2)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=26))]
    pub options: u8,

    /// Save the graded results here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for option shuffling and distractor sampling
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// PDF to inspect
    #[arg(short, long)]
    pub file: PathBuf,
}
