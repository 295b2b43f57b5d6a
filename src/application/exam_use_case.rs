// ============================================================
// Layer 2 — Exam Use Case
// ============================================================
// Builds multiple-choice exams from a PDF and grades answers.
//
// Per chunk, until enough items exist:
//   1. Ask the aggregator for ONE new question
//   2. Correct answer: the chunk sentence closest to the question
//      (normalised Levenshtein similarity, cutoff 0.6), else the
//      first sentence, else the language's placeholder answer
//   3. Distractors: other sentences of the chunk, sampled without
//      replacement and padded with a placeholder
//   4. Shuffle correct answer + distractors into the options
//
// Randomness comes from the caller's Rng so runs can be seeded.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::application::question_use_case::QuestionAggregator;
use crate::data::pipeline::DocumentPipeline;
use crate::data::sentences::answer_sentences;
use crate::domain::error::QgenResult;
use crate::domain::question::{ExamGradeReport, ExamItem, GradedAnswer};
use crate::infra::memory::MemoryMonitor;
use crate::ml::prompt::Language;

/// Minimum similarity for a sentence to count as the answer
const ANSWER_SIMILARITY_CUTOFF: f64 = 0.6;

pub struct ExamUseCase {
    pipeline:   DocumentPipeline,
    aggregator: QuestionAggregator,
    memory:     Arc<MemoryMonitor>,
}

impl ExamUseCase {
    pub fn new(pipeline: DocumentPipeline, aggregator: QuestionAggregator, memory: Arc<MemoryMonitor>) -> Self {
        Self { pipeline, aggregator, memory }
    }

    /// Build up to `num_questions` items of `num_options` options each.
    /// Consumes the use case and unloads the model when done.
    pub fn run<R: Rng>(
        self,
        path:          &Path,
        num_questions: usize,
        num_options:   usize,
        rng:           &mut R,
    ) -> QgenResult<Vec<ExamItem>> {
        let result = self.build(path, num_questions, num_options, rng);

        tracing::info!("Unloading model {}", self.aggregator.model_id());
        drop(self.aggregator);
        self.memory.reclaim(true);

        result
    }

    fn build<R: Rng>(
        &self,
        path:          &Path,
        num_questions: usize,
        num_options:   usize,
        rng:           &mut R,
    ) -> QgenResult<Vec<ExamItem>> {
        let language = self.aggregator.language();
        let mut exam = Vec::new();
        let mut seen = HashSet::new();

        if num_questions == 0 {
            return Ok(exam);
        }

        for chunk in self.pipeline.stream(path)? {
            for candidate in self.aggregator.generate_from_text(&chunk.text, 1, &mut seen) {
                exam.push(build_item(candidate.question, &chunk.text, num_options, language, rng));
                tracing::info!("Exam item {}/{} ready", exam.len(), num_questions);
            }
            if exam.len() >= num_questions {
                break;
            }
        }

        exam.truncate(num_questions);
        Ok(exam)
    }
}

/// Assemble one exam item for `question` out of the chunk it came from.
pub fn build_item<R: Rng>(
    question:    String,
    chunk_text:  &str,
    num_options: usize,
    language:    Language,
    rng:         &mut R,
) -> ExamItem {
    let sentences = answer_sentences(chunk_text);
    let answer    = closest_answer(&question, &sentences, language);

    let mut options = pick_distractors(&answer, &sentences, num_options.saturating_sub(1), language, rng);
    options.push(answer.clone());
    options.shuffle(rng);

    ExamItem { question, options, answer }
}

/// The sentence most similar to `question`, or the first sentence,
/// or the placeholder answer when there are none. Ties go to the
/// earlier sentence.
pub fn closest_answer(question: &str, sentences: &[&str], language: Language) -> String {
    let mut best: Option<(&str, f64)> = None;
    for &sentence in sentences {
        let score = similarity(question, sentence);
        if score >= ANSWER_SIMILARITY_CUTOFF && best.map_or(true, |(_, b)| score > b) {
            best = Some((sentence, score));
        }
    }

    best.map(|(s, _)| s)
        .or_else(|| sentences.first().copied())
        .unwrap_or(language.missing_answer())
        .to_string()
}

/// `n` distinct picks from the sentences other than `correct`,
/// padded with the placeholder distractor. Repeated sentences
/// count once.
pub fn pick_distractors<R: Rng>(
    correct:   &str,
    sentences: &[&str],
    n:         usize,
    language:  Language,
    rng:       &mut R,
) -> Vec<String> {
    let mut others: Vec<&str> = Vec::with_capacity(sentences.len());
    for &s in sentences {
        if s != correct && !others.contains(&s) {
            others.push(s);
        }
    }

    let mut picked: Vec<String> = others
        .choose_multiple(rng, n)
        .map(|s| s.to_string())
        .collect();
    picked.resize(n, language.placeholder_distractor().to_string());
    picked
}

/// Grade answers by position. A missing answer counts as incorrect.
pub fn grade(exam: &[ExamItem], answers: &[Option<String>]) -> ExamGradeReport {
    let details: Vec<GradedAnswer> = exam
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected   = answers.get(i).cloned().flatten();
            let is_correct = selected.as_deref() == Some(item.answer.as_str());
            GradedAnswer {
                question:        item.question.clone(),
                selected_answer: selected,
                correct_answer:  item.answer.clone(),
                is_correct,
            }
        })
        .collect();

    let total_count   = details.len();
    let correct_count = details.iter().filter(|d| d.is_correct).count();
    let score_percent = if total_count == 0 {
        0.0
    } else {
        correct_count as f64 / total_count as f64 * 100.0
    };

    ExamGradeReport { score_percent, correct_count, total_count, details }
}

/// 1 - levenshtein / longer length, over chars
fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
