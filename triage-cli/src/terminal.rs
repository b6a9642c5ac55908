//! Line-oriented operator over a terminal (or any reader/writer pair).

use console::style;
use std::io::{BufRead, Write};

use triage_common::util::pluralize;
use triage_common::Result;
use triage_core::annotation::{PresentReason, SessionSummary};
use triage_core::{Operator, Prompt, RelevanceScorer, Transition};

/// Presents records and reads commands line by line.
pub struct TerminalOperator<'a, R, W> {
    input: R,
    output: W,
    scorer: &'a RelevanceScorer,
    categories: Vec<String>,
}

impl<'a, R: BufRead, W: Write> TerminalOperator<'a, R, W> {
    pub fn new(input: R, output: W, scorer: &'a RelevanceScorer, categories: Vec<String>) -> Self {
        Self {
            input,
            output,
            scorer,
            categories,
        }
    }

    fn category_name(&self, index: usize) -> &str {
        self.categories.get(index).map_or("?", String::as_str)
    }

    /// Print end-of-session totals.
    pub fn write_summary(&mut self, summary: &SessionSummary) -> Result<()> {
        let out = &mut self.output;
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            style(if summary.quit {
                "Session ended"
            } else {
                "Pool exhausted"
            })
            .bold()
        )?;
        writeln!(
            out,
            "  sorted {}, skipped {}, undone {}",
            pluralize(summary.sorted, "record"),
            summary.skipped,
            summary.undone
        )?;
        for (name, count) in self.categories.iter().zip(&summary.per_category) {
            writeln!(out, "  {name}: {count}")?;
        }
        writeln!(
            out,
            "  {} left in the pool",
            pluralize(summary.remaining, "record")
        )?;
        out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<'_, R, W> {
    fn present(&mut self, prompt: &Prompt<'_>) -> Result<()> {
        let record = prompt.record;
        let terms: Vec<String> = self.scorer.matched_terms(&record.body).into_iter().collect();
        let out = &mut self.output;

        writeln!(out)?;
        let note = match prompt.reason {
            PresentReason::Fresh => String::new(),
            PresentReason::UndoReplay => format!(" {}", style("(again, after undo)").yellow()),
            PresentReason::Retry => format!(" {}", style("(nothing to undo)").yellow()),
        };
        writeln!(
            out,
            "{}{}",
            style(format!("record {} of {}", prompt.position, prompt.total)).bold(),
            note
        )?;
        writeln!(
            out,
            "{}",
            style(format!(
                "{} | r/{} | u/{} | score {:.4}",
                record.id,
                record.subreddit,
                record.author,
                record.score_or_zero()
            ))
            .dim()
        )?;
        writeln!(out)?;
        writeln!(out, "{}", record.body)?;
        writeln!(out)?;
        if terms.is_empty() {
            writeln!(out, "{}", style("lexicon hits: (none)").dim())?;
        } else {
            writeln!(out, "lexicon hits: {}", style(terms.join(", ")).cyan())?;
        }

        let menu: Vec<String> = prompt
            .categories
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}: {name}", i + 1))
            .collect();
        writeln!(out, "{}   u: undo   quit", menu.join("   "))?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;

        // Undecodable bytes become U+FFFD and parse as a skip.
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn acknowledge(&mut self, transition: &Transition) -> Result<()> {
        match transition {
            Transition::Recorded {
                record_id,
                category,
            } => {
                let name = self.category_name(*category).to_string();
                writeln!(self.output, "{} {record_id} -> {name}", style("saved").green())?;
            }
            Transition::Skipped { record_id } => {
                writeln!(self.output, "{} {record_id}", style("skipped").dim())?;
            }
            Transition::Undone {
                record_id,
                category,
            } => {
                let name = self.category_name(*category).to_string();
                writeln!(
                    self.output,
                    "{} {record_id} removed from {name}",
                    style("undone").yellow()
                )?;
            }
            Transition::NoPredecessor => {
                writeln!(self.output, "{}", style("nothing to undo").yellow())?;
            }
            Transition::Quit | Transition::Ignored => {}
        }
        Ok(())
    }
}
