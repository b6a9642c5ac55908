//! Sanitizer: drops removed, deleted, and near-empty records and projects the
//! rest onto the narrow per-source schema.
//!
//! Output is a pure function of input, in input order. Because the output
//! schema is a subset of the input schema, running the sanitizer over its own
//! output is a no-op.

use csv::Writer;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use triage_common::{Error, Result, ResultExt, SanitizerConfig};

use crate::record::SourceKind;
use crate::table::{self, Columns};
use crate::tokenize;

/// Why a record was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Body equals a removal/deletion marker.
    Removed,
    /// Fewer word tokens than the threshold.
    TooShort,
}

/// Per-run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub read: usize,
    pub kept: usize,
    pub removed: usize,
    pub too_short: usize,
    pub malformed: usize,
}

impl SanitizeReport {
    pub fn dropped(&self) -> usize {
        self.removed + self.too_short + self.malformed
    }
}

/// Record filter configured from [`SanitizerConfig`].
#[derive(Debug, Clone)]
pub struct Sanitizer {
    min_words: usize,
    removed_markers: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(&SanitizerConfig::default())
    }
}

impl Sanitizer {
    pub fn new(config: &SanitizerConfig) -> Self {
        Self {
            min_words: config.min_words,
            removed_markers: config.removed_markers.clone(),
        }
    }

    /// Decide whether a body survives.
    pub fn verdict(&self, body: &str) -> Verdict {
        if self.removed_markers.iter().any(|m| m == body) {
            Verdict::Removed
        } else if tokenize::word_count(body) < self.min_words {
            Verdict::TooShort
        } else {
            Verdict::Keep
        }
    }

    /// Filter one export stream into another.
    ///
    /// `source` only labels errors and logs.
    pub fn sanitize<R: Read, W: Write>(
        &self,
        kind: SourceKind,
        source: &Path,
        input: R,
        output: W,
    ) -> Result<SanitizeReport> {
        let mut reader = table::reader_from(input);
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers, kind.columns(), source)?;

        let mut writer = Writer::from_writer(output);
        writer.write_record(kind.columns())?;

        let mut report = SanitizeReport::default();
        for result in reader.records() {
            report.read += 1;

            let row = match result.map_err(table::classify_read_error) {
                Ok(row) => row,
                Err(e) if !e.is_fatal() => {
                    warn!(source = %source.display(), error = %e, "Rejected {} record", kind);
                    report.malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let fields = match columns.project(&row) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(source = %source.display(), error = %e, "Rejected {} record", kind);
                    report.malformed += 1;
                    continue;
                }
            };

            match self.verdict(fields[kind.body_index()]) {
                Verdict::Keep => {
                    writer.write_record(&fields)?;
                    report.kept += 1;
                }
                Verdict::Removed => {
                    debug!(id = fields[0], "Dropped removed {}", kind);
                    report.removed += 1;
                }
                Verdict::TooShort => {
                    debug!(id = fields[0], "Dropped short {}", kind);
                    report.too_short += 1;
                }
            }
        }

        writer.flush()?;
        Ok(report)
    }

    /// Filter `input` into `output`.
    ///
    /// Rows go to a temporary file beside `output` that replaces it only once
    /// sanitizing succeeds, so a failed run leaves any previous output intact
    /// and `output` may name the input itself.
    pub fn sanitize_file(
        &self,
        kind: SourceKind,
        input: &Path,
        output: &Path,
    ) -> Result<SanitizeReport> {
        let reader = File::open(input).context(format!("Failed to open {}", input.display()))?;
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)
            .context(format!("Failed to create a temporary file in {}", dir.display()))?;

        let report = self
            .sanitize(kind, input, reader, staged.as_file_mut())
            .map_err(|e| Error::with_context(e, format!("Sanitizing {}", input.display())))?;

        staged
            .persist(output)
            .map_err(|e| e.error)
            .context(format!("Failed to write {}", output.display()))?;

        info!(
            kind = %kind,
            input = %input.display(),
            output = %output.display(),
            read = report.read,
            kept = report.kept,
            removed = report.removed,
            too_short = report.too_short,
            malformed = report.malformed,
            "Finished sanitizing {}s",
            kind
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(kind: SourceKind, input: &str) -> (SanitizeReport, String) {
        let mut out = Vec::new();
        let report = Sanitizer::default()
            .sanitize(kind, Path::new("test.csv"), input.as_bytes(), &mut out)
            .unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_verdicts() {
        let sanitizer = Sanitizer::default();
        assert_eq!(sanitizer.verdict("[removed]"), Verdict::Removed);
        assert_eq!(sanitizer.verdict("[deleted]"), Verdict::Removed);
        assert_eq!(sanitizer.verdict("too short"), Verdict::TooShort);
        assert_eq!(sanitizer.verdict("... !!"), Verdict::TooShort);
        assert_eq!(sanitizer.verdict("just enough words"), Verdict::Keep);
    }

    #[test]
    fn test_posts_projected_and_filtered() {
        let input = "\
author,created_utc,submission_id,selftext,subreddit,title,score
ann,1,p1,I feel very low today,depression,Help,10
bob,2,p2,[removed],depression,Gone,3
cat,3,p3,ok then,anxiety,Short,1
";
        let (report, out) = run(SourceKind::Post, input);
        assert_eq!(report.read, 3);
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(report.too_short, 1);
        assert_eq!(
            out,
            "submission_id,author,subreddit,title,selftext\np1,ann,depression,Help,I feel very low today\n"
        );
    }

    #[test]
    fn test_comments_check_body_and_drop_deleted() {
        let input = "\
comment_id,parent_id,author,subreddit,body
c1,t3_p1,ann,anxiety,[deleted]
c2,t3_p1,bob,anxiety,\"Same here, honestly.\"
";
        let (report, out) = run(SourceKind::Comment, input);
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed, 1);
        assert!(out.contains("c2,t3_p1,bob,anxiety,\"Same here, honestly.\""));
        assert!(!out.contains("c1"));
    }

    #[test]
    fn test_short_rows_rejected_not_fatal() {
        let input = "\
comment_id,parent_id,author,subreddit,body
c1,t3_p1,ann
c2,t3_p1,bob,anxiety,this one is fine
";
        let (report, out) = run(SourceKind::Comment, input);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped(), 1);
        assert!(out.contains("c2"));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let input = "comment_id,author,subreddit,body\nc1,ann,x,some words here\n";
        let err = Sanitizer::default()
            .sanitize(
                SourceKind::Comment,
                Path::new("comments.csv"),
                input.as_bytes(),
                Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "parent_id"));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let input = "\
submission_id,author,subreddit,title,selftext
p1,ann,depression,Help,I feel very low today
p2,bob,depression,Hi,nope
";
        let (_, once) = run(SourceKind::Post, input);
        let (report, twice) = run(SourceKind::Post, &once);
        assert_eq!(once, twice);
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_header_only_input() {
        let (report, out) = run(SourceKind::Comment, "comment_id,parent_id,author,subreddit,body\n");
        assert_eq!(report, SanitizeReport::default());
        assert_eq!(out, "comment_id,parent_id,author,subreddit,body\n");
    }

    #[test]
    fn test_failed_run_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("posts.csv");
        let output = dir.path().join("sanitised_posts.csv");
        let previous = "submission_id,author,subreddit,title,selftext\np0,ann,x,T,kept from before\n";
        fs::write(&output, previous).unwrap();
        fs::write(&input, "submission_id,author,subreddit,title\np1,bob,x,Title\n").unwrap();

        let err = Sanitizer::default()
            .sanitize_file(SourceKind::Post, &input, &output)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("selftext"));
        assert_eq!(fs::read_to_string(&output).unwrap(), previous);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_sanitize_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("comments.csv");
        fs::write(
            &path,
            "\
comment_id,parent_id,author,subreddit,body,score
c1,t3_a,ann,x,i feel very low today,4
c2,t3_a,bob,x,[deleted],1
",
        )
        .unwrap();

        let report = Sanitizer::default()
            .sanitize_file(SourceKind::Comment, &path, &path)
            .unwrap();
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "comment_id,parent_id,author,subreddit,body\nc1,t3_a,ann,x,i feel very low today\n"
        );
    }
}
