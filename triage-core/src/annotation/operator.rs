//! The seam between a session and whoever is making decisions.

use triage_common::Result;

use super::session::{PresentReason, Transition};
use crate::record::Record;

/// A record awaiting a decision.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub record: &'a Record,
    /// 1-based position in the queue.
    pub position: usize,
    pub total: usize,
    pub reason: PresentReason,
    pub categories: &'a [String],
}

/// Source of decisions for [`AnnotationSession::run`](super::AnnotationSession::run).
pub trait Operator {
    /// Show a record and the available choices.
    fn present(&mut self, prompt: &Prompt<'_>) -> Result<()>;

    /// Next line of input, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Report the effect of the last command.
    fn acknowledge(&mut self, _transition: &Transition) -> Result<()> {
        Ok(())
    }
}

/// Replays a fixed list of input lines. Used in tests.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    lines: std::collections::VecDeque<String>,
    presented: Vec<String>,
    transitions: Vec<Transition>,
}

impl ScriptedOperator {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Ids in presentation order.
    pub fn presented(&self) -> &[String] {
        &self.presented
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl Operator for ScriptedOperator {
    fn present(&mut self, prompt: &Prompt<'_>) -> Result<()> {
        self.presented.push(prompt.record.id.clone());
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn acknowledge(&mut self, transition: &Transition) -> Result<()> {
        self.transitions.push(transition.clone());
        Ok(())
    }
}
