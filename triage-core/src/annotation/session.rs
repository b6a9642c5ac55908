//! The annotation state machine.
//!
//! ```text
//!            category / skip           queue exhausted or quit
//!   Presenting(r) ─────────────► Presenting(next) ─────────────► Terminated
//!        │   ▲
//!   undo │   │ no predecessor: Presenting(r) again
//!        ▼   │
//!   Presenting(prev) ──► Presenting(r) ──► Presenting(next) ...
//! ```
//!
//! The history is one slot deep: every category decision fills the
//! predecessor slot and `undo` consumes it. Skips never touch it, so a skip
//! cannot be undone. Undo re-presents the undone record, then the record that
//! was current when `undo` was typed, then continues with the queue.

use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

use triage_common::Result;

use super::command::Command;
use super::operator::{Operator, Prompt};
use crate::ranker::CandidateQueue;
use crate::record::Record;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a decision on the queue entry at this index.
    Presenting(usize),
    Terminated,
}

/// Why the current record is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentReason {
    /// First time in this session.
    Fresh,
    /// Re-presented after an undo.
    UndoReplay,
    /// `undo` had nothing to undo; same record again.
    Retry,
}

/// What a decision did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionKind {
    Category(usize),
    Skip,
    /// Cancelled the most recent category decision, for `record_id`.
    Undo,
}

/// One entry of the decision log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub record_id: String,
    pub kind: DecisionKind,
}

/// Append-only record of every decision in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionLog {
    entries: Vec<Decision>,
}

impl DecisionLog {
    fn push(&mut self, record_id: &str, kind: DecisionKind) {
        self.entries.push(Decision {
            record_id: record_id.to_string(),
            kind,
        });
    }

    pub fn entries(&self) -> &[Decision] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild per-category record ids by replaying the log.
    ///
    /// An undo cancels the most recent category decision still in effect.
    pub fn replay(&self, category_count: usize) -> Vec<Vec<String>> {
        let mut effective: Vec<(usize, &str)> = Vec::new();
        for entry in &self.entries {
            match entry.kind {
                DecisionKind::Category(c) => effective.push((c, &entry.record_id)),
                DecisionKind::Undo => {
                    effective.pop();
                }
                DecisionKind::Skip => {}
            }
        }

        let mut buckets = vec![Vec::new(); category_count];
        for (c, id) in effective {
            if let Some(bucket) = buckets.get_mut(c) {
                bucket.push(id.to_string());
            }
        }
        buckets
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Recorded { record_id: String, category: usize },
    Skipped { record_id: String },
    /// The decision on `record_id` was withdrawn; it is now presented again.
    Undone { record_id: String, category: usize },
    /// Nothing to undo; the current record is presented again.
    NoPredecessor,
    Quit,
    /// The session had already terminated.
    Ignored,
}

/// Counts reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Net category decisions.
    pub sorted: usize,
    pub skipped: usize,
    pub undone: usize,
    /// Net decisions per category.
    pub per_category: Vec<usize>,
    /// Records left in the pool.
    pub remaining: usize,
    /// Ended by `quit` rather than exhaustion.
    pub quit: bool,
}

/// Everything the session hands to persistence.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Full records per category, in decision order.
    pub buckets: Vec<Vec<Record>>,
    /// Queue records with no decision, in queue order.
    pub pool: Vec<Record>,
    pub log: DecisionLog,
    pub summary: SessionSummary,
}

#[derive(Debug, Clone, Copy)]
struct Predecessor {
    index: usize,
    category: usize,
}

/// Owns all mutable annotation state for one operator session.
#[derive(Debug)]
pub struct AnnotationSession {
    queue: CandidateQueue,
    categories: Vec<String>,
    state: SessionState,
    reason: PresentReason,
    /// Records owed a re-presentation, ahead of the queue cursor.
    upcoming: VecDeque<usize>,
    /// Next never-presented queue index.
    cursor: usize,
    predecessor: Option<Predecessor>,
    /// Queue indices per category, in decision order.
    buckets: Vec<Vec<usize>>,
    log: DecisionLog,
    skipped: usize,
    undone: usize,
    quit: bool,
}

impl AnnotationSession {
    /// Start a session presenting the first queue entry.
    pub fn new(queue: CandidateQueue, categories: Vec<String>) -> Self {
        let buckets = vec![Vec::new(); categories.len()];
        let mut session = Self {
            queue,
            categories,
            state: SessionState::Terminated,
            reason: PresentReason::Fresh,
            upcoming: VecDeque::new(),
            cursor: 0,
            predecessor: None,
            buckets,
            log: DecisionLog::default(),
            skipped: 0,
            undone: 0,
            quit: false,
        };
        session.advance();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn log(&self) -> &DecisionLog {
        &self.log
    }

    /// The record awaiting a decision, if any.
    pub fn prompt(&self) -> Option<Prompt<'_>> {
        match self.state {
            SessionState::Presenting(index) => Some(Prompt {
                record: self.queue.get(index)?,
                position: index + 1,
                total: self.queue.len(),
                reason: self.reason,
                categories: &self.categories,
            }),
            SessionState::Terminated => None,
        }
    }

    /// Ids currently assigned to a category.
    pub fn deletion_set(&self) -> HashSet<&str> {
        self.buckets
            .iter()
            .flatten()
            .filter_map(|&i| self.queue.get(i))
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Full records assigned to `category`, in decision order.
    pub fn bucket(&self, category: usize) -> Vec<&Record> {
        self.buckets
            .get(category)
            .map(|indices| indices.iter().filter_map(|&i| self.queue.get(i)).collect())
            .unwrap_or_default()
    }

    fn advance(&mut self) {
        if let Some(index) = self.upcoming.pop_front() {
            self.reason = PresentReason::UndoReplay;
            self.state = SessionState::Presenting(index);
        } else if self.cursor < self.queue.len() {
            self.reason = PresentReason::Fresh;
            self.state = SessionState::Presenting(self.cursor);
            self.cursor += 1;
        } else {
            self.state = SessionState::Terminated;
        }
    }

    fn record_id(&self, index: usize) -> String {
        self.queue
            .get(index)
            .map(|r| r.id.clone())
            .unwrap_or_default()
    }

    /// Apply one operator command to the current record.
    pub fn apply(&mut self, command: Command) -> Transition {
        let SessionState::Presenting(current) = self.state else {
            return Transition::Ignored;
        };
        let record_id = self.record_id(current);

        match command {
            Command::Category(category) if category < self.categories.len() => {
                self.buckets[category].push(current);
                self.log.push(&record_id, DecisionKind::Category(category));
                self.predecessor = Some(Predecessor {
                    index: current,
                    category,
                });
                debug!(id = %record_id, category, "Recorded decision");
                self.advance();
                Transition::Recorded {
                    record_id,
                    category,
                }
            }
            Command::Category(_) | Command::Skip => {
                self.log.push(&record_id, DecisionKind::Skip);
                self.skipped += 1;
                self.advance();
                Transition::Skipped { record_id }
            }
            Command::Undo => match self.predecessor.take() {
                Some(prev) => {
                    if let Some(pos) = self.buckets[prev.category]
                        .iter()
                        .rposition(|&i| i == prev.index)
                    {
                        self.buckets[prev.category].remove(pos);
                    }
                    let undone_id = self.record_id(prev.index);
                    self.log.push(&undone_id, DecisionKind::Undo);
                    self.undone += 1;

                    self.upcoming.push_front(current);
                    self.reason = PresentReason::UndoReplay;
                    self.state = SessionState::Presenting(prev.index);
                    debug!(id = %undone_id, category = prev.category, "Undid decision");
                    Transition::Undone {
                        record_id: undone_id,
                        category: prev.category,
                    }
                }
                None => {
                    self.reason = PresentReason::Retry;
                    Transition::NoPredecessor
                }
            },
            Command::Quit => {
                self.quit = true;
                self.state = SessionState::Terminated;
                Transition::Quit
            }
        }
    }

    /// Drive the session against an operator until it terminates.
    ///
    /// End of operator input counts as `quit`.
    pub fn run<O: Operator>(&mut self, operator: &mut O) -> Result<()> {
        while let Some(prompt) = self.prompt() {
            operator.present(&prompt)?;

            let command = match operator.read_line()? {
                Some(line) => {
                    let command = Command::parse(&line, self.categories.len());
                    if command == Command::Skip {
                        debug!(input = %line.trim(), "Unrecognized input treated as skip");
                    }
                    command
                }
                None => {
                    info!("End of operator input, ending session");
                    Command::Quit
                }
            };

            let transition = self.apply(command);
            operator.acknowledge(&transition)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        let per_category: Vec<usize> = self.buckets.iter().map(Vec::len).collect();
        let sorted = per_category.iter().sum();
        SessionSummary {
            sorted,
            skipped: self.skipped,
            undone: self.undone,
            per_category,
            remaining: self.queue.len() - sorted,
            quit: self.quit,
        }
    }

    /// Split the queue into labeled buckets and the remaining pool.
    pub fn into_outcome(self) -> SessionOutcome {
        let summary = self.summary();
        let decided: HashSet<String> = self.deletion_set().into_iter().map(String::from).collect();

        let buckets: Vec<Vec<Record>> = self
            .buckets
            .iter()
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| self.queue.get(i).cloned())
                    .collect()
            })
            .collect();

        let pool = self
            .queue
            .into_records()
            .into_iter()
            .filter(|r| !decided.contains(&r.id))
            .collect();

        SessionOutcome {
            buckets,
            pool,
            log: self.log,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(ids: &[&str]) -> CandidateQueue {
        CandidateQueue::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| Record::new(*id, "a", "s", "b").with_score(10.0 - i as f64))
                .collect(),
        )
    }

    fn session(ids: &[&str]) -> AnnotationSession {
        AnnotationSession::new(
            queue(ids),
            vec!["one".into(), "two".into(), "three".into()],
        )
    }

    fn current_id(s: &AnnotationSession) -> Option<String> {
        s.prompt().map(|p| p.record.id.clone())
    }

    fn bucket_ids(s: &AnnotationSession, c: usize) -> Vec<String> {
        s.bucket(c).iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_initial_state_presents_first_record() {
        let s = session(&["A", "B"]);
        assert_eq!(s.state(), SessionState::Presenting(0));
        let prompt = s.prompt().unwrap();
        assert_eq!(prompt.position, 1);
        assert_eq!(prompt.total, 2);
        assert_eq!(prompt.reason, PresentReason::Fresh);
    }

    #[test]
    fn test_empty_queue_terminates_immediately() {
        let s = session(&[]);
        assert!(s.is_terminated());
        assert!(s.prompt().is_none());
    }

    #[test]
    fn test_category_skip_category_then_exhaustion() {
        let mut s = session(&["A", "B", "C"]);
        s.apply(Command::Category(0));
        s.apply(Command::Skip);
        s.apply(Command::Category(1));
        assert!(s.is_terminated());

        let outcome = s.into_outcome();
        let ids = |v: &Vec<Record>| v.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&outcome.buckets[0]), vec!["A"]);
        assert_eq!(ids(&outcome.buckets[1]), vec!["C"]);
        assert!(outcome.buckets[2].is_empty());
        assert_eq!(ids(&outcome.pool), vec!["B"]);
        assert!(!outcome.summary.quit);
        assert_eq!(outcome.summary.sorted, 2);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.remaining, 1);
    }

    #[test]
    fn test_undo_without_predecessor_represents_current() {
        let mut s = session(&["A", "B"]);
        assert_eq!(s.apply(Command::Undo), Transition::NoPredecessor);
        assert_eq!(current_id(&s).as_deref(), Some("A"));
        assert_eq!(s.prompt().unwrap().reason, PresentReason::Retry);
    }

    #[test]
    fn test_skip_is_not_undoable() {
        let mut s = session(&["A", "B", "C"]);
        s.apply(Command::Skip);
        assert_eq!(s.apply(Command::Undo), Transition::NoPredecessor);
        assert_eq!(current_id(&s).as_deref(), Some("B"));
    }

    #[test]
    fn test_undo_represents_previous_then_current() {
        let mut s = session(&["A", "B", "C"]);
        s.apply(Command::Category(0));
        assert_eq!(current_id(&s).as_deref(), Some("B"));

        assert_eq!(
            s.apply(Command::Undo),
            Transition::Undone {
                record_id: "A".into(),
                category: 0
            }
        );
        assert!(bucket_ids(&s, 0).is_empty());
        assert_eq!(current_id(&s).as_deref(), Some("A"));
        assert_eq!(s.prompt().unwrap().reason, PresentReason::UndoReplay);

        s.apply(Command::Category(2));
        assert_eq!(current_id(&s).as_deref(), Some("B"));
        assert_eq!(s.prompt().unwrap().reason, PresentReason::UndoReplay);

        s.apply(Command::Category(1));
        assert_eq!(current_id(&s).as_deref(), Some("C"));
        assert_eq!(s.prompt().unwrap().reason, PresentReason::Fresh);

        assert_eq!(bucket_ids(&s, 2), vec!["A"]);
        assert_eq!(bucket_ids(&s, 1), vec!["B"]);
    }

    #[test]
    fn test_undo_leaves_earlier_decisions() {
        let mut s = session(&["A", "B", "C"]);
        s.apply(Command::Category(0));
        s.apply(Command::Category(0));
        s.apply(Command::Undo);
        assert_eq!(bucket_ids(&s, 0), vec!["A"]);
        assert_eq!(current_id(&s).as_deref(), Some("B"));
    }

    #[test]
    fn test_second_undo_in_a_row_has_no_predecessor() {
        let mut s = session(&["A", "B"]);
        s.apply(Command::Category(0));
        s.apply(Command::Undo);
        assert_eq!(s.apply(Command::Undo), Transition::NoPredecessor);
        assert_eq!(current_id(&s).as_deref(), Some("A"));
    }

    #[test]
    fn test_commands_after_termination_are_ignored() {
        let mut s = session(&["A", "B"]);
        s.apply(Command::Category(0));
        s.apply(Command::Category(1));
        assert!(s.is_terminated());
        assert_eq!(s.apply(Command::Undo), Transition::Ignored);
    }

    #[test]
    fn test_quit_keeps_decisions_and_pool() {
        let mut s = session(&["A", "B", "C"]);
        s.apply(Command::Category(2));
        assert_eq!(s.apply(Command::Quit), Transition::Quit);
        assert!(s.is_terminated());

        let outcome = s.into_outcome();
        assert!(outcome.summary.quit);
        assert_eq!(outcome.buckets[2].len(), 1);
        let pool: Vec<_> = outcome.pool.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(pool, vec!["B", "C"]);
    }

    #[test]
    fn test_out_of_range_category_is_skip() {
        let mut s = session(&["A", "B"]);
        assert_eq!(
            s.apply(Command::Category(7)),
            Transition::Skipped {
                record_id: "A".into()
            }
        );
    }

    #[test]
    fn test_log_replay_matches_buckets() {
        let mut s = session(&["A", "B", "C", "D"]);
        s.apply(Command::Category(0));
        s.apply(Command::Skip);
        s.apply(Command::Category(1));
        s.apply(Command::Undo);
        s.apply(Command::Category(2));
        s.apply(Command::Undo);
        s.apply(Command::Category(0));
        s.apply(Command::Category(1));

        let replayed = s.log().replay(3);
        for c in 0..3 {
            assert_eq!(replayed[c], bucket_ids(&s, c), "category {c}");
        }
    }

    #[test]
    fn test_deletion_set_tracks_buckets() {
        let mut s = session(&["A", "B"]);
        s.apply(Command::Category(0));
        assert!(s.deletion_set().contains("A"));
        s.apply(Command::Undo);
        assert!(s.deletion_set().is_empty());
    }
}
