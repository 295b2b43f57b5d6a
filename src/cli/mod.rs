// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, wires the layers together and prints results. Workflow
// logic is delegated to Layer 2 (application).
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;
pub mod exam_session;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use commands::{Commands, ExamArgs, GlobalArgs, InspectArgs, ModelArgs, QuestionsArgs};

use crate::application::exam_use_case::{grade, ExamUseCase};
use crate::application::question_use_case::{QuestionAggregator, QuestionUseCase};
use crate::data::chunker::Chunker;
use crate::data::extractor::DocumentExtractor;
use crate::data::loader::LopdfBackend;
use crate::data::pipeline::DocumentPipeline;
use crate::domain::document::DocumentMetadata;
use crate::infra::memory::MemoryMonitor;
use crate::infra::model_store::ModelStore;
use crate::infra::report;
use crate::infra::settings::Settings;
use crate::ml::catalog::{self, ModelInfo, ModelSpec, SUPPORTED_MODELS};
use crate::ml::t5_generator::T5Generator;
use exam_session::{present_exam, ExamWorker};

#[derive(Parser, Debug)]
#[command(
    name = "pdf-qgen",
    version,
    about = "Generate questions and multiple-choice exams from PDF files with small T5 models."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings::from(&self.global)
    }

    /// Match on the subcommand and dispatch. The CLI only routes and prints.
    pub fn run(self) -> Result<()> {
        let settings = self.settings();
        let memory   = Arc::new(MemoryMonitor::new(settings.max_memory_gb));

        match self.command {
            Commands::Questions(args) => run_questions(&settings, memory, args),
            Commands::Exam(args)      => run_exam(&settings, memory, args),
            Commands::Models          => run_models(),
            Commands::Memory          => run_memory(&memory),
            Commands::Inspect(args)   => run_inspect(memory, args),
        }
    }
}

fn build_pipeline(settings: &Settings, memory: &Arc<MemoryMonitor>) -> DocumentPipeline {
    DocumentPipeline::new(
        DocumentExtractor::new(Arc::new(LopdfBackend::new()), Arc::clone(memory)),
        Chunker::new(settings.chunk_size, settings.overlap, Arc::clone(memory)),
        Arc::clone(memory),
    )
}

/// Validate the file and print the metadata banner
fn check_document(pipeline: &DocumentPipeline, file: &Path) -> Result<()> {
    let meta = pipeline
        .extractor()
        .check(file)
        .with_context(|| format!("'{}' cannot be processed", file.display()))?;
    print_metadata(&meta, file);
    Ok(())
}

fn load_aggregator(settings: &Settings, args: &ModelArgs) -> Result<QuestionAggregator> {
    let spec: &ModelSpec = catalog::resolve(args.model.as_deref());
    println!("Loading model {}...", spec.id);

    let mut store = ModelStore::new(&settings.model_cache_dir);
    if let Some(dir) = &args.model_dir {
        store = store.with_local_dir(dir);
    }
    let files     = store.resolve(spec)?;
    let generator = T5Generator::load(spec, &files, args.max_length)?;

    println!("Model loaded: {}\n", spec.description);
    Ok(QuestionAggregator::new(Box::new(generator), spec.language))
}

fn run_questions(settings: &Settings, memory: Arc<MemoryMonitor>, args: QuestionsArgs) -> Result<()> {
    let pipeline = build_pipeline(settings, &memory);
    check_document(&pipeline, &args.file)?;

    let aggregator = load_aggregator(settings, &args.model)?;
    println!("Processing PDF and generating questions...");

    let use_case  = QuestionUseCase::new(pipeline, aggregator, Arc::clone(&memory));
    let questions = use_case
        .run(&args.file, args.num_questions)
        .context("Question generation failed")?;

    println!("\nGENERATION COMPLETE");
    println!("Total valid questions: {}", questions.len());
    println!("{}", "-".repeat(50));
    for (i, q) in questions.iter().enumerate() {
        println!("{:2}. {}", i + 1, q.question);
        println!("    {} | {}\n", q.kind, q.model);
    }

    if let Some(output) = &args.output {
        report::write_questions(output, &questions, Some(&args.file))?;
        println!("Questions saved to {}", output.display());
    }
    Ok(())
}

fn run_exam(settings: &Settings, memory: Arc<MemoryMonitor>, args: ExamArgs) -> Result<()> {
    let pipeline = build_pipeline(settings, &memory);
    check_document(&pipeline, &args.file)?;

    let aggregator = load_aggregator(settings, &args.model)?;
    let use_case   = ExamUseCase::new(pipeline, aggregator, Arc::clone(&memory));

    print!("Building exam");
    io::stdout().flush()?;
    let worker = ExamWorker::spawn(
        use_case,
        args.file.clone(),
        args.num_questions,
        usize::from(args.options),
        args.seed,
    )?;
    let exam = worker.wait(&mut io::stdout())?;

    if exam.is_empty() {
        bail!("No exam questions could be generated from '{}'", args.file.display());
    }
    if exam.len() < args.num_questions {
        println!("Only {} of {} questions could be generated.", exam.len(), args.num_questions);
    }

    let answers = present_exam(&exam, &mut io::stdin().lock(), &mut io::stdout())?;
    let graded  = grade(&exam, &answers);

    println!("\n{}", report::render_exam_results(&graded));

    if let Some(output) = &args.output {
        report::write_exam_results(output, &graded)?;
        println!("Results saved to {}", output.display());
    }
    Ok(())
}

fn run_models() -> Result<()> {
    println!("Supported models:");
    for spec in SUPPORTED_MODELS {
        let info = ModelInfo::from(spec);
        let mark = if spec.id == catalog::DEFAULT_MODEL { " (default)" } else { "" };
        println!("  {}{}", info.name, mark);
        println!("    type: {} | size: ~{}MB", info.kind, info.size_mb);
        println!("    {}", info.description);
    }
    Ok(())
}

fn run_memory(memory: &MemoryMonitor) -> Result<()> {
    let snap = memory.snapshot();
    println!("Process resident:  {:.1} MB", snap.process_resident_mb);
    println!("System used:       {:.1} %", snap.system_used_percent);
    println!("System available:  {:.2} GB", snap.system_available_gb());
    println!("System total:      {:.1} MB", snap.system_total_mb);
    println!("Ceiling:           {:.1} GB", memory.max_memory_gb());
    println!("Under pressure:    {}", memory.is_under_pressure());
    Ok(())
}

fn run_inspect(memory: Arc<MemoryMonitor>, args: InspectArgs) -> Result<()> {
    let extractor = DocumentExtractor::new(Arc::new(LopdfBackend::new()), memory);

    match extractor.check(&args.file) {
        Ok(meta) => {
            println!("Valid PDF: yes");
            print_metadata(&meta, &args.file);
        }
        Err(e) => {
            tracing::warn!("{e}");
            println!("Valid PDF: no");
        }
    }
    Ok(())
}

fn print_metadata(meta: &DocumentMetadata, file: &Path) {
    let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    println!("PDF: {}", meta.display_title(&name));
    if let Some(author) = &meta.author {
        println!("Author: {author}");
    }
    match meta.page_count {
        Some(n) => println!("Pages: {n}"),
        None    => println!("Pages: N/A"),
    }
    println!("Size: {:.1}MB\n", meta.file_size_mb.unwrap_or(0.0));
}
