// ============================================================
// Layer 3 — Question and Exam Domain Types
// ============================================================
// QuestionCandidate is the unit of output of a generation run.
// ExamItem / ExamGradeReport only exist in exam mode.

use serde::{Deserialize, Serialize};

/// Tag attached to every question produced by a question-generation model
pub const QG_KIND: &str = "QG";

/// A validated question produced by the generator.
///
/// Two candidates are the same question when their text is identical;
/// that is the key used for deduplication within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub question: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub model: String,

    /// Length in characters of the chunk the question came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_length: Option<usize>,
}

impl QuestionCandidate {
    pub fn new(question: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            question:      question.into(),
            kind:          QG_KIND.to_string(),
            model:         model.into(),
            source_length: None,
        }
    }

    pub fn with_source_length(mut self, len: usize) -> Self {
        self.source_length = Some(len);
        self
    }
}

impl PartialEq for QuestionCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.question == other.question
    }
}

impl Eq for QuestionCandidate {}

/// One multiple-choice question.
///
/// `options` holds the correct answer exactly once plus the distractors,
/// in shuffled order. `answer` is the unshuffled correct answer used
/// for grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamItem {
    pub question: String,
    pub options:  Vec<String>,
    pub answer:   String,
}

impl ExamItem {
    /// Option text for a letter label (`A`, `B`, ...), case-insensitive
    pub fn option_for_label(&self, label: &str) -> Option<&str> {
        let mut chars = label.trim().chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        let idx = (c as u8 - b'A') as usize;
        self.options.get(idx).map(String::as_str)
    }

    /// Letter label for the option at `idx`
    pub fn label(idx: usize) -> char {
        (b'A' + (idx % 26) as u8) as char
    }
}

/// Result for one exam item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAnswer {
    pub question:        String,
    /// `None` when the user gave no answer for this position
    pub selected_answer: Option<String>,
    pub correct_answer:  String,
    pub is_correct:      bool,
}

/// Outcome of grading a whole exam
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamGradeReport {
    pub score_percent: f64,
    pub correct_count: usize,
    pub total_count:   usize,
    pub details:       Vec<GradedAnswer>,
}
