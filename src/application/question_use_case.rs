// ============================================================
// Layer 2 — Question Use Case
// ============================================================
// Streams a PDF through the data pipeline and turns each chunk
// into validated, deduplicated questions:
//   1. Split the chunk into sentences
//   2. Prompt the generator with every sentence of 30+ characters
//   3. Trim, validate per language, drop anything already seen
//   4. Stop at the per-chunk count, then at the run total
// The model is always unloaded and memory reclaimed at the end.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::data::pipeline::DocumentPipeline;
use crate::data::sentences::prompt_sentences;
use crate::domain::error::QgenResult;
use crate::domain::question::QuestionCandidate;
use crate::domain::traits::Generator;
use crate::infra::memory::MemoryMonitor;
use crate::ml::prompt::Language;

const MIN_SENTENCE_CHARS: usize = 30;
const MAX_PER_CHUNK:      usize = 3;

/// Drives the generator over text and keeps only acceptable questions.
pub struct QuestionAggregator {
    generator: Box<dyn Generator>,
    language:  Language,
}

impl QuestionAggregator {
    pub fn new(generator: Box<dyn Generator>, language: Language) -> Self {
        Self { generator, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    /// Up to `count` new questions from `text`.
    ///
    /// `seen` holds every question accepted so far in the run; accepted
    /// questions are added to it. A failing generator call skips its
    /// sentence.
    pub fn generate_from_text(
        &self,
        text:  &str,
        count: usize,
        seen:  &mut HashSet<String>,
    ) -> Vec<QuestionCandidate> {
        let mut accepted = Vec::new();
        if count == 0 {
            return accepted;
        }

        for sentence in prompt_sentences(text) {
            if sentence.chars().count() < MIN_SENTENCE_CHARS {
                continue;
            }

            let prompt  = self.language.build_prompt(sentence);
            let outputs = match self.generator.generate(&prompt) {
                Ok(outputs) => outputs,
                Err(e) => {
                    tracing::warn!("Question generation skipped a sentence: {e}");
                    continue;
                }
            };

            for raw in outputs {
                let question = raw.trim();
                if !self.language.is_valid_question(question) || seen.contains(question) {
                    continue;
                }
                seen.insert(question.to_string());
                accepted.push(QuestionCandidate::new(question, self.model_id()));
                if accepted.len() >= count {
                    return accepted;
                }
            }
        }

        tracing::debug!("Accepted {} questions from {} chars of text", accepted.len(), text.len());
        accepted
    }
}

/// Questions each chunk is asked for when `total` are wanted overall
pub fn questions_per_chunk(total: usize) -> usize {
    (total / 5).clamp(1, MAX_PER_CHUNK)
}

pub struct QuestionUseCase {
    pipeline:   DocumentPipeline,
    aggregator: QuestionAggregator,
    memory:     Arc<MemoryMonitor>,
}

impl QuestionUseCase {
    pub fn new(pipeline: DocumentPipeline, aggregator: QuestionAggregator, memory: Arc<MemoryMonitor>) -> Self {
        Self { pipeline, aggregator, memory }
    }

    /// Generate up to `total` questions from the document at `path`.
    /// Consumes the use case: the model is unloaded afterwards, on
    /// success and on failure alike.
    pub fn run(self, path: &Path, total: usize) -> QgenResult<Vec<QuestionCandidate>> {
        let result = self.collect(path, total);

        tracing::info!("Unloading model {}", self.aggregator.model_id());
        drop(self.aggregator);
        self.memory.reclaim(true);

        result
    }

    fn collect(&self, path: &Path, total: usize) -> QgenResult<Vec<QuestionCandidate>> {
        let per_chunk = questions_per_chunk(total);
        let mut seen      = HashSet::new();
        let mut questions = Vec::new();

        if total == 0 {
            return Ok(questions);
        }

        for chunk in self.pipeline.stream(path)? {
            tracing::info!("Processing chunk {} ({} chars)...", chunk.index + 1, chunk.length_chars);

            let found = self.aggregator.generate_from_text(&chunk.text, per_chunk, &mut seen);
            if !found.is_empty() {
                tracing::info!("Generated {} questions from chunk {}", found.len(), chunk.index + 1);
            }
            questions.extend(found.into_iter().map(|q| q.with_source_length(chunk.length_chars)));

            if questions.len() >= total {
                questions.truncate(total);
                break;
            }
        }

        tracing::info!("Generation complete: {} valid questions", questions.len());
        Ok(questions)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::chunker::Chunker;
    use crate::data::extractor::tests::{touch, FakeBackend};
    use crate::data::extractor::DocumentExtractor;
    use crate::domain::error::GenerationError;
    use crate::infra::memory::tests::calm_monitor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator answering every prompt through a closure
    pub(crate) struct FnGenerator<F>(pub F);

    impl<F> FnGenerator<F>
    where
        F: Fn(&str) -> Result<Vec<String>, GenerationError> + Send,
    {
        pub(crate) fn new(f: F) -> Self {
            Self(f)
        }
    }

    impl<F> Generator for FnGenerator<F>
    where
        F: Fn(&str) -> Result<Vec<String>, GenerationError> + Send,
    {
        fn generate(&self, prompt: &str) -> Result<Vec<String>, GenerationError> {
            (self.0)(prompt)
        }

        fn model_id(&self) -> &str {
            "fake/qg"
        }
    }

    /// Turns "contexto: X respuesta: X" into "¿X?" plus one junk output
    pub(crate) fn spanish_echo() -> Box<dyn Generator> {
        Box::new(FnGenerator::new(|prompt: &str| {
            let sentence = prompt
                .trim_start_matches("contexto: ")
                .split(" respuesta: ")
                .next()
                .unwrap_or_default()
                .trim_end_matches('.');
            Ok(vec![format!("  ¿{sentence}?  "), "What is this about?".to_string()])
        }))
    }

    const TEXT: &str = "La mitocondria produce energía para la célula. \
                        Corto. \
                        El ribosoma sintetiza proteínas en el citoplasma. \
                        El núcleo guarda el material genético de la célula.";

    #[test]
    fn test_questions_per_chunk() {
        assert_eq!(questions_per_chunk(1), 1);
        assert_eq!(questions_per_chunk(10), 2);
        assert_eq!(questions_per_chunk(100), 3);
        assert_eq!(questions_per_chunk(0), 1);
    }

    #[test]
    fn test_accepts_valid_trimmed_questions() {
        let agg  = QuestionAggregator::new(spanish_echo(), Language::Spanish);
        let mut seen = HashSet::new();
        let qs = agg.generate_from_text(TEXT, 10, &mut seen);

        let texts: Vec<&str> = qs.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "¿La mitocondria produce energía para la célula?",
                "¿El ribosoma sintetiza proteínas en el citoplasma?",
                "¿El núcleo guarda el material genético de la célula?",
            ]
        );
        assert!(qs.iter().all(|q| q.kind == "QG" && q.model == "fake/qg"));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_stops_at_requested_count() {
        let agg = QuestionAggregator::new(spanish_echo(), Language::Spanish);
        assert_eq!(agg.generate_from_text(TEXT, 2, &mut HashSet::new()).len(), 2);
        assert!(agg.generate_from_text(TEXT, 0, &mut HashSet::new()).is_empty());
    }

    #[test]
    fn test_deduplicates_across_calls() {
        let agg = QuestionAggregator::new(spanish_echo(), Language::Spanish);
        let mut seen = HashSet::new();
        assert_eq!(agg.generate_from_text(TEXT, 10, &mut seen).len(), 3);
        assert!(agg.generate_from_text(TEXT, 10, &mut seen).is_empty());
    }

    #[test]
    fn test_generator_failure_skips_only_that_sentence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let generator = FnGenerator::new(move |_prompt: &str| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(GenerationError::Inference("out of memory".into()));
            }
            Ok(vec!["¿Cuál es la función del orgánulo?".to_string()])
        });
        let agg = QuestionAggregator::new(Box::new(generator), Language::Spanish);

        let qs = agg.generate_from_text(TEXT, 10, &mut HashSet::new());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // same text from both surviving sentences is kept once
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn test_short_sentences_never_reach_the_generator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let generator = FnGenerator::new(move |_prompt: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });
        let agg = QuestionAggregator::new(Box::new(generator), Language::English);
        agg.generate_from_text("Too short. Also short! Tiny?", 5, &mut HashSet::new());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_english_prompt_template_is_used() {
        let generator = FnGenerator::new(|prompt: &str| {
            assert!(prompt.starts_with("generate question: "));
            assert!(prompt.contains(" answer: "));
            Ok(vec!["What does the mitochondria produce?".to_string()])
        });
        let agg = QuestionAggregator::new(Box::new(generator), Language::English);
        let qs  = agg.generate_from_text("The mitochondria produces energy for the cell.", 1, &mut HashSet::new());
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn test_use_case_limits_total_and_records_source_length() {
        let dir  = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "bio.pdf");
        let memory = Arc::new(calm_monitor());

        // every prompt yields a distinct question
        let step = AtomicUsize::new(0);
        let generator = FnGenerator::new(move |_prompt: &str| {
            Ok(vec![format!("¿Qué ocurre en el paso {}?", step.fetch_add(1, Ordering::SeqCst))])
        });
        let page: String = (0..40)
            .map(|i| format!("La frase numero {i} describe un proceso celular."))
            .collect::<Vec<_>>()
            .join(" ");

        let pipeline = DocumentPipeline::new(
            DocumentExtractor::new(Arc::new(FakeBackend::with_pages(&[page.as_str()])), Arc::clone(&memory)),
            Chunker::new(60, 10, Arc::clone(&memory)),
            Arc::clone(&memory),
        );
        let use_case = QuestionUseCase::new(
            pipeline,
            QuestionAggregator::new(Box::new(generator), Language::Spanish),
            memory,
        );

        let qs = use_case.run(&path, 4).unwrap();
        assert_eq!(qs.len(), 4);
        assert!(qs.iter().all(|q| q.source_length.is_some()));
        let unique: HashSet<&str> = qs.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(unique.len(), 4);
    }
}
