// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal: a list of questions, or a multiple-choice exam.
//
// Rules for this layer:
//   - No model or tensor code here (that's Layer 5)
//   - No printing or prompting the user (that's Layer 1)
//   - No direct PDF or file access (that's Layer 4 and 6)
//   - Only workflow coordination

// Question generation over a streamed document
pub mod question_use_case;

// Exam building and grading
pub mod exam_use_case;
