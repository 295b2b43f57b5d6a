// ============================================================
// Layer 6 — Report Writers
// ============================================================
// Serialises generation results to disk:
//
//   questions → .json : array of {question, type, model, source_length}
//             → other : numbered plain-text listing
//   exam      → plain-text results sheet
//
// Rendering is separated from writing so the layouts can be
// tested without touching the filesystem.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::error::{QgenError, QgenResult};
use crate::domain::question::{ExamGradeReport, QuestionCandidate};

const RULE_WIDTH: usize = 50;

/// Save questions, picking the format from the file extension
pub fn write_questions(
    path:      &Path,
    questions: &[QuestionCandidate],
    source:    Option<&Path>,
) -> QgenResult<()> {
    let body = if has_extension(path, "json") {
        serde_json::to_string_pretty(questions)
            .map_err(|e| QgenError::Report { path: path.to_path_buf(), source: e.into() })?
    } else {
        render_questions_text(questions, source)
    };

    write_file(path, &body)?;
    tracing::info!("Saved {} questions to '{}'", questions.len(), path.display());
    Ok(())
}

/// Save a graded exam as a plain-text results sheet
pub fn write_exam_results(path: &Path, report: &ExamGradeReport) -> QgenResult<()> {
    write_file(path, &render_exam_results(report))?;
    tracing::info!("Saved exam results to '{}'", path.display());
    Ok(())
}

pub fn render_questions_text(questions: &[QuestionCandidate], source: Option<&Path>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GENERATED QUESTIONS");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out);

    if let Some(source) = source {
        let name = source.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let _ = writeln!(out, "Source: {name}");
        let _ = writeln!(out, "Total questions: {}", questions.len());
        let _ = writeln!(out);
    }

    for (i, q) in questions.iter().enumerate() {
        let source_length = q
            .source_length
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(out, "{:2}. {}", i + 1, q.question);
        let _ = writeln!(out, "    Type: {}", q.kind);
        let _ = writeln!(out, "    Model: {}", q.model);
        let _ = writeln!(out, "    Source length: {source_length} characters");
        let _ = writeln!(out);
    }
    out
}

pub fn render_exam_results(report: &ExamGradeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Exam results");
    let _ = writeln!(out, "Correct: {} of {}", report.correct_count, report.total_count);
    let _ = writeln!(out, "Score: {:.2}%", report.score_percent);
    let _ = writeln!(out);

    for (i, d) in report.details.iter().enumerate() {
        let _ = writeln!(out, "Question {}: {}", i + 1, d.question);
        let _ = writeln!(out, "  Selected: {}", d.selected_answer.as_deref().unwrap_or("(no answer)"));
        let _ = writeln!(out, "  Correct: {}", d.correct_answer);
        let _ = writeln!(out, "  {}", if d.is_correct { "[OK] Correct" } else { "[X] Incorrect" });
        let _ = writeln!(out);
    }
    out
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn write_file(path: &Path, body: &str) -> QgenResult<()> {
    let to_err = |source| QgenError::Report { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    fs::write(path, body).map_err(to_err)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question::GradedAnswer;

    fn sample_questions() -> Vec<QuestionCandidate> {
        vec![
            QuestionCandidate::new("What is a cell?", "t5-small").with_source_length(300),
            QuestionCandidate::new("Where is the nucleus?", "t5-small"),
        ]
    }

    #[test]
    fn test_text_listing_layout() {
        let text = render_questions_text(&sample_questions(), Some(Path::new("/tmp/bio.pdf")));
        assert!(text.contains("Source: bio.pdf"));
        assert!(text.contains("Total questions: 2"));
        assert!(text.contains(" 1. What is a cell?"));
        assert!(text.contains("    Source length: 300 characters"));
        assert!(text.contains("    Source length: N/A characters"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("questions.JSON");
        write_questions(&path, &sample_questions(), None).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.as_array().unwrap().len(), 2);
        assert_eq!(raw[0]["type"], "QG");
        assert_eq!(raw[0]["source_length"], 300);
    }

    #[test]
    fn test_exam_results_sheet() {
        let report = ExamGradeReport {
            score_percent: 50.0,
            correct_count: 1,
            total_count:   2,
            details: vec![
                GradedAnswer {
                    question:        "Q1?".into(),
                    selected_answer: Some("a".into()),
                    correct_answer:  "a".into(),
                    is_correct:      true,
                },
                GradedAnswer {
                    question:        "Q2?".into(),
                    selected_answer: None,
                    correct_answer:  "b".into(),
                    is_correct:      false,
                },
            ],
        };
        let text = render_exam_results(&report);
        assert!(text.contains("Correct: 1 of 2"));
        assert!(text.contains("Score: 50.00%"));
        assert!(text.contains("(no answer)"));
        assert!(text.contains("[X] Incorrect"));
    }
}
