//! Triage Core - the record pipeline behind the `triage` CLI.
//!
//! Stages, in order:
//! - [`sanitizer`]: drop removed and near-empty records, narrow the schema
//! - [`scorer`]: lexicon-based relevance score per record
//! - [`ranker`]: global dedupe by id and descending sort into a candidate queue
//! - [`annotation`]: operator session with single-step undo over the queue
//!
//! [`medication`] is a side scan over the sanitized exports.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod annotation;
pub mod lexicon;
pub mod medication;
pub mod ranker;
pub mod record;
pub mod sanitizer;
pub mod scorer;
pub mod table;
pub mod tokenize;

pub use annotation::{AnnotationSession, Command, Operator, PoolFile, Prompt, Transition};
pub use lexicon::{Lexicon, Lexicons};
pub use medication::{MedicationHit, MedicationReport, MedicationScanner};
pub use ranker::{rank_files, CandidateQueue, Offer, RankReport, Ranker};
pub use record::{Record, SourceKind};
pub use sanitizer::{SanitizeReport, Sanitizer, Verdict};
pub use scorer::{RelevanceScorer, ScoreBreakdown};
