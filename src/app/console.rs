use std::io::{self, BufRead, Write};

use crate::grid::{Progress, Prompt, TaskKind, TaskOutcome, TransferTask};
use crate::style::{Palette, Role};

/// Asks on stdout and reads one line from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&self, question: &str) -> String {
        println!("{}", question);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut answer) {
            tracing::warn!("Could not read confirmation: {}", err);
            answer.clear();
        }
        let answer = strip_line_ending(&answer).to_string();
        tracing::debug!("Confirmation answer: {:?}", answer);
        answer
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Prints one line per task as workers pick them up.
pub struct ConsoleProgress {
    palette: Palette,
}

impl ConsoleProgress {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

fn batch_header(kind: TaskKind, count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    match kind {
        TaskKind::Download => format!("> Copying {} file{}...", count, plural),
        TaskKind::Upload => format!("> Uploading {} file{}...", count, plural),
        TaskKind::Rename => format!("> Moving {} file{}...", count, plural),
        TaskKind::Delete => format!("> Deleting {} file{}...", count, plural),
        TaskKind::Mkdir => format!(
            "> Creating {} director{}...",
            count,
            if count == 1 { "y" } else { "ies" }
        ),
    }
}

impl Progress for ConsoleProgress {
    fn on_batch(&self, kind: TaskKind, count: usize) {
        println!("{}", batch_header(kind, count));
    }

    fn on_start(&self, task: &TransferTask) {
        println!("{}", task);
    }

    fn on_finish(&self, outcome: &TaskOutcome) {
        tracing::debug!(
            "Task {} finished, ok = {}",
            outcome.task.sequence_index() + 1,
            outcome.succeeded()
        );
        if let Some(err) = &outcome.error {
            eprintln!("{}", self.palette.paint(&format!("ERROR: {}", err), Role::Error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_pluralised() {
        assert_eq!(batch_header(TaskKind::Download, 1), "> Copying 1 file...");
        assert_eq!(batch_header(TaskKind::Rename, 3), "> Moving 3 files...");
        assert_eq!(batch_header(TaskKind::Mkdir, 2), "> Creating 2 directories...");
        assert_eq!(batch_header(TaskKind::Mkdir, 1), "> Creating 1 directory...");
    }

    #[test]
    fn only_the_line_ending_is_stripped() {
        assert_eq!(strip_line_ending("y\n"), "y");
        assert_eq!(strip_line_ending("yes\r\n"), "yes");
        assert_eq!(strip_line_ending(" y \n"), " y ");
        assert_eq!(strip_line_ending(""), "");
    }
}
