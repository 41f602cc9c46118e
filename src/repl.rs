// repl.rs
use crate::responses::errors::APOLOGY;
use crate::service::AppService;
use std::io::{self, BufRead, Write};
use tracing::error;

const EXIT_WORDS: [&str; 2] = ["exit", "salir"];

/// Interactive question loop. Returns how many questions were sent to the
/// agent; ends on an exit word or end of input.
pub fn run_chat<R: BufRead, W: Write>(svc: &AppService, input: R, mut out: W) -> io::Result<usize> {
    writeln!(out, "\nSQL agent ready. Ask a question about the restaurants.")?;
    writeln!(out, "Type 'exit' or 'salir' to end the session.\n")?;

    let mut asked = 0;
    let mut lines = input.lines();

    loop {
        write!(out, "Question: ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        let question = line.trim();

        if EXIT_WORDS.iter().any(|w| question.eq_ignore_ascii_case(w)) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        asked += 1;
        match svc.answer(question) {
            Ok(answer) => {
                writeln!(out, "\nAnswer:\n{answer}")?;
            }
            Err(e) => {
                error!("Question failed: {e}");
                writeln!(out, "\n{APOLOGY}")?;
            }
        }
        writeln!(out, "{}", "-".repeat(30))?;
    }

    Ok(asked)
}
