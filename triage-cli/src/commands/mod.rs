//! One module per subcommand.

pub mod annotate;
pub mod config;
pub mod meds;
pub mod rank;
pub mod sanitize;

use std::path::{Path, PathBuf};

use triage_common::Config;
use triage_core::{Lexicons, RelevanceScorer};

/// A path given on the command line, or the configured one resolved against
/// the data directory.
pub(crate) fn path_or(flag: Option<&Path>, config: &Config, configured: &Path) -> PathBuf {
    flag.map_or_else(|| config.paths.resolve(configured), Path::to_path_buf)
}

/// Scorer built from the configured lexicon files.
pub(crate) fn load_scorer(config: &Config) -> anyhow::Result<RelevanceScorer> {
    let lexicons = Lexicons::load(
        &config.paths.resolve(&config.paths.topical_lexicon),
        &config.paths.resolve(&config.paths.affect_lexicon),
    )?;
    tracing::info!(
        topical = lexicons.topical.len(),
        affect = lexicons.affect.len(),
        "Loaded lexicons"
    );
    Ok(RelevanceScorer::new(lexicons, &config.scorer))
}
