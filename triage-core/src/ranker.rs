//! Ranking and global deduplication of scored records.
//!
//! Posts are offered before comments. The first occurrence of an id wins,
//! whether or not it turned out relevant; zero-score records are dropped; the
//! survivors are stably sorted by score, highest first.

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use triage_common::{Error, Result, ResultExt};

use crate::record::{Record, SourceKind};
use crate::scorer::RelevanceScorer;
use crate::table::{self, Columns};

/// What happened to an offered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// Id already seen in this run.
    Duplicate,
    /// Score was 0.
    Irrelevant,
}

/// Per-run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankReport {
    pub offered: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub irrelevant: usize,
    pub malformed: usize,
}

/// Accumulates scored records until [`Ranker::finish`].
#[derive(Debug, Default)]
pub struct Ranker {
    seen: HashSet<String>,
    candidates: Vec<Record>,
    report: RankReport,
}

impl Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one scored record.
    pub fn offer(&mut self, record: Record) -> Offer {
        self.report.offered += 1;
        if !self.seen.insert(record.id.clone()) {
            self.report.duplicates += 1;
            return Offer::Duplicate;
        }
        if record.score_or_zero() <= 0.0 {
            self.report.irrelevant += 1;
            return Offer::Irrelevant;
        }
        self.report.accepted += 1;
        self.candidates.push(record);
        Offer::Accepted
    }

    /// Score and offer every record of a sanitized stream.
    pub fn offer_source<R: Read>(
        &mut self,
        scorer: &RelevanceScorer,
        kind: SourceKind,
        source: &Path,
        input: R,
    ) -> Result<()> {
        let mut reader = table::reader_from(input);
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers, kind.columns(), source)?;

        for result in reader.records() {
            let projected = result
                .map_err(table::classify_read_error)
                .and_then(|row| columns.project(&row).map(|f| kind.to_record(&f)));
            let record = match projected {
                Ok(record) => record,
                Err(e) if !e.is_fatal() => {
                    warn!(source = %source.display(), error = %e, "Rejected {} record", kind);
                    self.report.offered += 1;
                    self.report.malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let scored = scorer.score_record(record);
            let id = scored.id.clone();
            if self.offer(scored) == Offer::Duplicate {
                debug!(id = %id, "Skipped duplicate {}", kind);
            }
        }
        Ok(())
    }

    /// Score and offer a sanitized file.
    pub fn offer_file(
        &mut self,
        scorer: &RelevanceScorer,
        kind: SourceKind,
        path: &Path,
    ) -> Result<()> {
        let file = File::open(path).context(format!("Failed to open {}", path.display()))?;
        self.offer_source(scorer, kind, path, file)
            .map_err(|e| e.with_context(format!("Ranking {}", path.display())))?;
        info!(kind = %kind, path = %path.display(), "Scored {}s", kind);
        Ok(())
    }

    pub fn report(&self) -> RankReport {
        self.report
    }

    /// Sort and materialize the candidate queue.
    pub fn finish(self) -> (CandidateQueue, RankReport) {
        let mut candidates = self.candidates;
        // Stable: equal scores keep encounter order.
        candidates.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
        (CandidateQueue::new(candidates), self.report)
    }
}

/// Ranked, deduplicated, fully materialized candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateQueue {
    records: Vec<Record>,
}

impl CandidateQueue {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Write `score, id, author, subreddit, body` rows with a header.
    pub fn write_to<W: Write>(&self, output: W) -> Result<()> {
        write_records(output, &self.records, true)
    }

    /// Read a ranked/pool file. Any unparsable row is an error.
    pub fn read_from<R: Read>(input: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().from_reader(input);
        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<Record>().enumerate() {
            let record = row.map_err(|e| {
                Error::malformed(
                    e.position().map_or(i as u64 + 2, csv::Position::line),
                    e.to_string(),
                )
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Write the queue to a new file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
        self.write_to(file)
    }

    /// Load a queue from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open {}", path.display()))?;
        Self::read_from(file).map_err(|e| e.with_context(format!("Reading {}", path.display())))
    }
}

/// Serialize records in candidate-file layout.
pub(crate) fn write_records<W: Write>(output: W, records: &[Record], header: bool) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(header)
        .from_writer(output);
    if header && records.is_empty() {
        writer.write_record(["score", "id", "author", "subreddit", "body"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Sanitized posts then comments, scored, deduplicated, and ranked.
pub fn rank_files(
    scorer: &RelevanceScorer,
    posts: &Path,
    comments: &Path,
) -> Result<(CandidateQueue, RankReport)> {
    let mut ranker = Ranker::new();
    ranker.offer_file(scorer, SourceKind::Post, posts)?;
    ranker.offer_file(scorer, SourceKind::Comment, comments)?;
    Ok(ranker.finish())
}
