//! Persistence for annotation results.
//!
//! The working pool is held under an exclusive lock for the whole session so
//! two operators cannot draw from the same file. Labeled buckets are appended
//! to before the pool is rewritten; a crash in between leaves a record in both
//! places rather than in neither.

use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use triage_common::{Result, ResultExt};

use super::session::SessionOutcome;
use crate::ranker::{write_records, CandidateQueue};
use crate::record::Record;

/// An exclusively locked working pool file.
#[derive(Debug)]
pub struct PoolFile {
    path: PathBuf,
    file: File,
}

impl PoolFile {
    /// Open and lock an existing pool. Blocks while another session holds it.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .context(format!("Failed to open pool {}", path.display()))?;
        file.lock_exclusive()
            .context(format!("Failed to lock pool {}", path.display()))?;
        debug!(path = %path.display(), "Locked pool");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole pool.
    pub fn read_queue(&mut self) -> Result<CandidateQueue> {
        self.file.seek(SeekFrom::Start(0))?;
        CandidateQueue::read_from(&self.file)
            .map_err(|e| e.with_context(format!("Reading pool {}", self.path.display())))
    }

    /// Replace the pool contents with `records`, header included.
    pub fn rewrite(&mut self, records: &[Record]) -> Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        write_records(&self.file, records, true)?;
        self.file
            .sync_all()
            .context(format!("Failed to sync pool {}", self.path.display()))?;
        info!(path = %self.path.display(), remaining = records.len(), "Rewrote pool");
        Ok(())
    }
}

impl Drop for PoolFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to unlock pool");
        }
    }
}

/// Append `records` to a bucket file, writing the header only into a new or
/// empty file.
pub fn append_bucket(path: &Path, records: &[Record]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(format!("Failed to open bucket {}", path.display()))?;
    let needs_header = file.metadata()?.len() == 0;
    write_records(&file, records, needs_header)
        .map_err(|e| e.with_context(format!("Appending to {}", path.display())))?;
    info!(path = %path.display(), appended = records.len(), "Appended to bucket");
    Ok(())
}

/// Flush a finished session: buckets first, then the pool.
///
/// `bucket_paths[c]` receives the records labeled with category `c`.
pub fn persist(outcome: &SessionOutcome, bucket_paths: &[PathBuf], pool: &mut PoolFile) -> Result<()> {
    for (records, path) in outcome.buckets.iter().zip(bucket_paths) {
        append_bucket(path, records)?;
    }
    pool.rewrite(&outcome.pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str) -> Record {
        Record::new(id, "a", "s", "b").with_score(1.0)
    }

    #[test]
    fn test_append_bucket_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bucket.csv");

        append_bucket(&path, &[record("A")]).unwrap();
        append_bucket(&path, &[record("B")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "score,id,author,subreddit,body\n1.0,A,a,s,b\n1.0,B,a,s,b\n"
        );
    }

    #[test]
    fn test_append_nothing_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bucket.csv");
        append_bucket(&path, &[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_append_into_empty_file_adds_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bucket.csv");
        std::fs::write(&path, "").unwrap();
        append_bucket(&path, &[record("A")]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("score,id,"));
    }

    #[test]
    fn test_pool_rewrite_shrinks_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pool.csv");
        CandidateQueue::new(vec![record("A"), record("B"), record("C")])
            .save(&path)
            .unwrap();

        {
            let mut pool = PoolFile::open(&path).unwrap();
            assert_eq!(pool.read_queue().unwrap().len(), 3);
            pool.rewrite(&[record("B")]).unwrap();
            assert_eq!(pool.read_queue().unwrap().len(), 1);
        }

        let reloaded = CandidateQueue::load(&path).unwrap();
        assert_eq!(reloaded.records(), &[record("B")]);
    }

    #[test]
    fn test_missing_pool_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = PoolFile::open(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_fatal());
    }
}
