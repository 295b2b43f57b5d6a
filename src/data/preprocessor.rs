// ============================================================
// Layer 4 — Page Preprocessor
// ============================================================
// Cleans the raw text of one PDF page before it joins the
// document's full text.
//
// Cleaning steps (applied in order):
//   1. Remove control characters: C0 except \t \n \r, DEL, and
//      the C1 range U+0080..U+009F. Printable Latin-1 such as
//      accented letters is kept.
//   2. Collapse every whitespace run, line breaks included, to a
//      single space and trim. The page becomes one line, so words
//      split across extracted lines stay in their sentence.
//   3. Drop the result if it is shorter than 10 characters: a page
//      holding only a page number or a running header.

const MIN_PAGE_CHARS: usize = 10;

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean one page of raw text.
    pub fn clean_page(&self, text: &str) -> String {
        let stripped: String = text.chars().filter(|c| !is_stripped_control(*c)).collect();
        let collapsed = collapse_whitespace(&stripped);

        if collapsed.chars().count() >= MIN_PAGE_CHARS {
            collapsed
        } else {
            String::new()
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// True for characters removed in step 1
pub fn is_stripped_control(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' => true,
        _ => false,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
