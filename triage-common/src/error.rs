//! Error types for the triage pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the triage error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the triage pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Lexicon file could not be loaded
    #[error("Failed to load lexicon {}: {source}", path.display())]
    Lexicon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited file lacks a column every record needs
    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A single record could not be used
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a per-record rejection.
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the run.
    ///
    /// Record-level problems are reported and skipped; everything touching
    /// files or streams is fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MalformedRecord { .. } => false,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => true,
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!Error::malformed(3, "missing body").is_fatal());
        assert!(Error::Io(std::io::Error::other("disk full")).is_fatal());
        assert!(Error::MissingColumn {
            path: PathBuf::from("posts.csv"),
            column: "selftext".into(),
        }
        .is_fatal());
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::malformed(7, "short row");
        let with_ctx = err.with_context("reading comments");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert!(!with_ctx.is_fatal());
        assert_eq!(
            with_ctx.to_string(),
            "reading comments: Malformed record at line 7: short row"
        );
    }

    #[test]
    fn test_result_ext_wraps_io() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = res.context("opening pool").unwrap_err();
        assert!(err.to_string().starts_with("opening pool: IO error"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_lexicon_error_names_path() {
        let err = Error::Lexicon {
            path: PathBuf::from("emotion_lexicon.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("emotion_lexicon.csv"));
    }
}
