// ============================================================
// Layer 1 — Interactive Exam Session
// ============================================================
// Exam generation is slow, so it runs on a worker thread:
//
//   main thread                      exam-worker
//   ───────────                      ───────────
//   spawn ─────────────────────────▶ ExamUseCase::run
//   poll (progress dots) ◀── one ─── send(result)
//   present items, read answers
//
// The worker owns everything it touches and hands back a single
// result message; the front-end never sees partial state.
// Reading and writing go through BufRead / Write so the
// presentation can be driven from tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::exam_use_case::ExamUseCase;
use crate::domain::error::QgenResult;
use crate::domain::question::ExamItem;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A running exam build
pub struct ExamWorker {
    result: Receiver<QgenResult<Vec<ExamItem>>>,
    handle: JoinHandle<()>,
}

impl ExamWorker {
    pub fn spawn(
        use_case:      ExamUseCase,
        file:          PathBuf,
        num_questions: usize,
        num_options:   usize,
        seed:          Option<u64>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("exam-worker".into())
            .spawn(move || {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None       => StdRng::from_entropy(),
                };
                let result = use_case.run(&file, num_questions, num_options, &mut rng);
                // receiver gone means the front-end already gave up
                let _ = tx.send(result);
            })
            .context("Cannot start exam worker thread")?;

        Ok(Self { result: rx, handle })
    }

    /// Block until the worker posts its result, printing a dot per poll.
    pub fn wait<W: Write>(self, out: &mut W) -> Result<Vec<ExamItem>> {
        let outcome = loop {
            match self.result.recv_timeout(POLL_INTERVAL) {
                Ok(result) => break result.map_err(anyhow::Error::from),
                Err(RecvTimeoutError::Timeout) => {
                    write!(out, ".")?;
                    out.flush()?;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    break Err(anyhow!("exam worker stopped without a result"));
                }
            }
        };
        writeln!(out)?;

        if self.handle.join().is_err() {
            tracing::warn!("Exam worker panicked after sending its result");
        }
        outcome
    }
}

/// Show every item and collect one answer per item.
///
/// Answers are letters (`A`, `B`, ...); anything else is asked again.
/// End of input leaves the current and remaining items unanswered.
pub fn present_exam<R: BufRead, W: Write>(
    exam:   &[ExamItem],
    input:  &mut R,
    out:    &mut W,
) -> io::Result<Vec<Option<String>>> {
    let mut answers = Vec::with_capacity(exam.len());

    'items: for (n, item) in exam.iter().enumerate() {
        writeln!(out, "\nQuestion {}: {}", n + 1, item.question)?;
        for (i, option) in item.options.iter().enumerate() {
            writeln!(out, "  {}) {}", ExamItem::label(i), option)?;
        }
        let last = ExamItem::label(item.options.len().saturating_sub(1));

        loop {
            write!(out, "Your answer (A-{last}): ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break 'items;
            }
            match item.option_for_label(&line) {
                Some(option) => {
                    answers.push(Some(option.to_string()));
                    break;
                }
                None => writeln!(out, "Invalid option, try again.")?,
            }
        }
    }

    answers.resize(exam.len(), None);
    Ok(answers)
}
