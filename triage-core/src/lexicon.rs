//! Lexicon loading.
//!
//! A lexicon file holds one term per delimited field with no header. Commas
//! and line breaks both separate terms, and quoted fields may contain either.
//! Terms are trimmed and lowercased; empty fields are ignored.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use triage_common::{Error, Result};

use crate::table;

/// An immutable, case-insensitive set of terms.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    name: String,
    terms: HashSet<String>,
}

impl Lexicon {
    /// Build a lexicon from in-memory terms.
    pub fn from_terms<I, S>(name: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            name: name.into(),
            terms,
        }
    }

    /// Read lexicon terms from a delimited stream.
    pub fn read<R: Read>(name: impl Into<String>, input: R) -> Result<Self> {
        Ok(Self::from_terms(name, table::read_fields(input)?))
    }

    /// Load a lexicon file. A missing or unreadable file is fatal.
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Lexicon {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::read(name, file)
            .map_err(|e| e.with_context(format!("Parsing lexicon {}", path.display())))?;
        tracing::info!(
            lexicon = %lexicon.name,
            path = %path.display(),
            terms = lexicon.len(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Membership test for an already-lowercased token.
    pub fn contains(&self, token: &str) -> bool {
        self.terms.contains(token)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms present in both lexicons.
    pub fn overlap<'a>(&'a self, other: &'a Lexicon) -> impl Iterator<Item = &'a str> + 'a {
        self.terms
            .iter()
            .filter(move |t| other.terms.contains(*t))
            .map(String::as_str)
    }
}

/// The two vocabularies used by scoring.
#[derive(Debug, Clone, Default)]
pub struct Lexicons {
    /// Topical (mental-health) vocabulary
    pub topical: Lexicon,
    /// Affect (emotion) vocabulary
    pub affect: Lexicon,
}

impl Lexicons {
    pub fn new(topical: Lexicon, affect: Lexicon) -> Self {
        let shared = topical.overlap(&affect).count();
        if shared > 0 {
            tracing::warn!(
                shared,
                "Topical and affect lexicons overlap; shared terms count toward both"
            );
        }
        Self { topical, affect }
    }

    /// Load both lexicon files.
    pub fn load(topical: &Path, affect: &Path) -> Result<Self> {
        Ok(Self::new(
            Lexicon::load("topical", topical)?,
            Lexicon::load("affect", affect)?,
        ))
    }
}
