//! Medication mention scan over sanitized exports.
//!
//! Posts match when `selftext` contains a medication name or `title` contains
//! it preceded by a space; comments match when `body` contains it. Matching is
//! case-sensitive substring search and the first listed name that matches is
//! reported.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use triage_common::{Result, ResultExt};

use crate::record::SourceKind;
use crate::table::{self, Columns};

/// One record that mentions a medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationHit {
    pub id: String,
    pub medication: String,
}

/// Scan results for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationReport {
    pub scanned: usize,
    pub hits: Vec<MedicationHit>,
}

/// Ordered list of medication names.
#[derive(Debug, Clone, Default)]
pub struct MedicationScanner {
    names: Vec<String>,
}

impl MedicationScanner {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|n: String| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// Every field of every row of a header-less delimited file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open medication names {}", path.display()))?;
        let scanner = Self::new(table::read_fields(file)?);
        info!(path = %path.display(), names = scanner.len(), "Loaded medication names");
        Ok(scanner)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First medication mentioned by a post.
    pub fn match_post(&self, title: &str, selftext: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| selftext.contains(name.as_str()) || title.contains(&format!(" {name}")))
            .map(String::as_str)
    }

    /// First medication mentioned by a comment.
    pub fn match_comment(&self, body: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| body.contains(name.as_str()))
            .map(String::as_str)
    }

    /// Scan a sanitized export stream.
    pub fn scan<R: Read>(
        &self,
        kind: SourceKind,
        source: &Path,
        input: R,
    ) -> Result<MedicationReport> {
        let mut reader = table::reader_from(input);
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers, kind.columns(), source)?;

        let mut report = MedicationReport::default();
        for result in reader.records() {
            let row = match result.map_err(table::classify_read_error) {
                Ok(row) => row,
                Err(e) if !e.is_fatal() => {
                    warn!(source = %source.display(), error = %e, "Skipped {} record", kind);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let fields = match columns.project(&row) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(source = %source.display(), error = %e, "Skipped {} record", kind);
                    continue;
                }
            };
            report.scanned += 1;

            let found = match kind {
                SourceKind::Post => self.match_post(fields[3], fields[4]),
                SourceKind::Comment => self.match_comment(fields[4]),
            };
            if let Some(medication) = found {
                report.hits.push(MedicationHit {
                    id: fields[0].to_string(),
                    medication: medication.to_string(),
                });
            }
        }
        Ok(report)
    }

    /// Scan a sanitized export file.
    pub fn scan_file(&self, kind: SourceKind, path: &Path) -> Result<MedicationReport> {
        let file = File::open(path).context(format!("Failed to open {}", path.display()))?;
        let report = self.scan(kind, path, file)?;
        info!(
            kind = %kind,
            scanned = report.scanned,
            detected = report.hits.len(),
            "Finished medication scan"
        );
        Ok(report)
    }
}
