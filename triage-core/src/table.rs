//! Header-indexed access to delimited export files.
//!
//! Raw exports carry many more columns than the pipeline uses, in whatever
//! order the export tool chose. [`Columns`] resolves the needed names against
//! the header once; rows are then projected by index.

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use triage_common::{Error, Result, ResultExt};

/// Open a delimited file with a header row.
pub fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).context(format!("Failed to open {}", path.display()))?;
    Ok(reader_from(file))
}

/// Build a header-aware reader that tolerates short rows.
pub fn reader_from<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

/// Every non-empty field of every row of a header-less delimited stream, in
/// file order. Quoted fields are unquoted and rows may differ in length.
pub fn read_fields<R: Read>(input: R) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut fields = Vec::new();
    for row in reader.records() {
        let row = row?;
        fields.extend(
            row.iter()
                .map(|f| f.trim_start_matches('\u{feff}').trim())
                .filter(|f| !f.is_empty())
                .map(String::from),
        );
    }
    Ok(fields)
}

/// Resolved positions of required columns.
#[derive(Debug, Clone)]
pub struct Columns {
    names: &'static [&'static str],
    indices: Vec<usize>,
}

impl Columns {
    /// Resolve `names` against a header row.
    ///
    /// A missing column is fatal: every record would be malformed.
    pub fn resolve(
        headers: &StringRecord,
        names: &'static [&'static str],
        source: &Path,
    ) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|h| h.trim_start_matches('\u{feff}').trim() == *name)
                    .ok_or_else(|| Error::MissingColumn {
                        path: source.to_path_buf(),
                        column: (*name).to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names, indices })
    }

    /// Project a row onto the resolved columns, in `names` order.
    pub fn project<'r>(&self, row: &'r StringRecord) -> Result<Vec<&'r str>> {
        self.indices
            .iter()
            .zip(self.names)
            .map(|(&idx, name)| {
                row.get(idx)
                    .ok_or_else(|| Error::malformed(line_of(row), format!("missing '{name}'")))
            })
            .collect()
    }
}

/// 1-based line of a row, or 0 when unknown.
pub fn line_of(row: &StringRecord) -> u64 {
    row.position().map_or(0, csv::Position::line)
}

/// Split a csv read failure into per-record problems and fatal ones.
pub fn classify_read_error(err: csv::Error) -> Error {
    if err.is_io_error() {
        return Error::Csv(err);
    }
    let line = err.position().map_or(0, csv::Position::line);
    Error::malformed(line, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["id", "body"];

    #[test]
    fn test_resolve_out_of_order_with_bom() {
        let headers = StringRecord::from(vec!["\u{feff}extra", "body", "id"]);
        let columns = Columns::resolve(&headers, NAMES, Path::new("x.csv")).unwrap();
        let row = StringRecord::from(vec!["ignored", "hello", "42"]);
        assert_eq!(columns.project(&row).unwrap(), vec!["42", "hello"]);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let headers = StringRecord::from(vec!["id"]);
        let err = Columns::resolve(&headers, NAMES, Path::new("x.csv")).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "body"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_short_row_is_per_record() {
        let headers = StringRecord::from(vec!["id", "body"]);
        let columns = Columns::resolve(&headers, NAMES, Path::new("x.csv")).unwrap();
        let row = StringRecord::from(vec!["only-id"]);
        let err = columns.project(&row).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_read_fields_unquotes_and_flattens() {
        let data = "\u{feff}sad,\"self-harm\"\r\n\"lonely, isolated\",,\nhopeless\n";
        let fields = read_fields(data.as_bytes()).unwrap();
        assert_eq!(fields, vec!["sad", "self-harm", "lonely, isolated", "hopeless"]);
    }

    #[test]
    fn test_reader_tolerates_short_rows() {
        let data = "id,body\n1,hello\n2\n";
        let mut reader = reader_from(data.as_bytes());
        let rows: Vec<_> = reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 1);
    }
}
