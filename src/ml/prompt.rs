// ============================================================
// Layer 5 — Prompts and Output Validation
// ============================================================
// T5 question-generation models are prompted with a sentence used
// both as context and as the expected answer. Their raw outputs
// are noisy, so each one is checked against per-language rules
// before it is accepted as a question.

use serde::Serialize;

const MIN_LEN_EXCLUSIVE: usize = 10;
const MAX_LEN_EXCLUSIVE: usize = 200;

/// English interrogatives a Spanish model sometimes echoes
const ENGLISH_STEMS: [&str; 6] = ["what", "who", "when", "where", "why", "how"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    /// Prompt embedding `sentence` as context and answer
    pub fn build_prompt(self, sentence: &str) -> String {
        match self {
            Language::English => format!("generate question: {sentence} answer: {sentence}"),
            Language::Spanish => format!("contexto: {sentence} respuesta: {sentence}"),
        }
    }

    /// Whether a trimmed model output is acceptable as a question
    pub fn is_valid_question(self, question: &str) -> bool {
        let len = question.chars().count();
        if len <= MIN_LEN_EXCLUSIVE || len >= MAX_LEN_EXCLUSIVE {
            return false;
        }
        let lower = question.to_lowercase();

        match self {
            Language::English => {
                question.contains('?')
                    && question.chars().next().is_some_and(char::is_uppercase)
                    && !question.contains(['¿', '¡'])
                    && !lower.starts_with("context:")
                    && !lower.starts_with("answer:")
            }
            Language::Spanish => {
                (question.contains('¿') || question.contains('?'))
                    && !ENGLISH_STEMS.iter().any(|stem| lower.starts_with(stem))
            }
        }
    }

    /// Exam answer used when a chunk has no usable sentence
    pub fn missing_answer(self) -> &'static str {
        match self {
            Language::English => "Answer not available",
            Language::Spanish => "Respuesta no disponible",
        }
    }

    /// Distractor used to pad an option set
    pub fn placeholder_distractor(self) -> &'static str {
        match self {
            Language::English => "Incorrect option",
            Language::Spanish => "Opción incorrecta",
        }
    }
}
