// ============================================================
// Layer 4 — Sentence Splitting
// ============================================================
// Two deliberately different splitters over chunk text:
//
//   prompt_sentences — boundaries at `.`, `!` or `?` followed by
//                      whitespace; the terminator stays with its
//                      sentence. Feeds question prompts.
//   answer_sentences — every `.` is a boundary; pieces are trimmed
//                      and only those longer than 10 characters kept.
//                      Feeds exam answers and distractors.

const MIN_ANSWER_CHARS_EXCLUSIVE: usize = 10;

/// Split text into trimmed, non-empty sentences at `. `, `! ` and `? `
pub fn prompt_sentences(text: &str) -> Vec<&str> {
    let mut out   = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_i, next_c)) = chars.peek() {
            if next_c.is_whitespace() {
                push_trimmed(&mut out, &text[start..next_i]);
                start = next_i;
            }
        }
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

/// Sentences usable as exam answers: split on `.`, trimmed, longer than 10 chars
pub fn answer_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_ANSWER_CHARS_EXCLUSIVE)
        .collect()
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}
