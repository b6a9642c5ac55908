//! `triage annotate`

use anyhow::{bail, Result};
use clap::Args;
use std::io;
use std::path::PathBuf;
use tracing::info;

use triage_common::logging::generate_run_id;
use triage_common::stage_span;
use triage_common::Config;
use triage_core::annotation::persist;
use triage_core::{AnnotationSession, PoolFile};

use super::{load_scorer, path_or};
use crate::terminal::TerminalOperator;

#[derive(Args, Debug, Default)]
pub struct AnnotateArgs {
    /// Working pool to draw from and rewrite
    #[arg(long)]
    pub pool: Option<PathBuf>,
}

pub fn run(config: &Config, args: &AnnotateArgs) -> Result<()> {
    let run_id = generate_run_id();
    let pool_path = path_or(args.pool.as_deref(), config, &config.paths.pool);
    let span = stage_span!("annotate", run_id, pool = %pool_path.display());
    let _enter = span.enter();

    if !pool_path.exists() {
        bail!(
            "No working pool at {}; run `triage rank` first",
            pool_path.display()
        );
    }

    let scorer = load_scorer(config)?;
    let mut pool = PoolFile::open(&pool_path)?;
    let queue = pool.read_queue()?;
    if queue.is_empty() {
        println!("The working pool is empty; nothing to annotate.");
        return Ok(());
    }
    info!(candidates = queue.len(), "Starting annotation session");

    let categories: Vec<String> = config
        .annotation
        .categories
        .iter()
        .map(|c| c.name.clone())
        .collect();
    let bucket_paths: Vec<PathBuf> = config
        .annotation
        .categories
        .iter()
        .map(|c| config.bucket_path(c))
        .collect();

    let mut session = AnnotationSession::new(queue, categories.clone());
    let stdin = io::stdin();
    let mut operator = TerminalOperator::new(stdin.lock(), io::stdout(), &scorer, categories);

    // Decisions made before an operator I/O failure are still flushed.
    let run_result = session.run(&mut operator);

    let outcome = session.into_outcome();
    persist(&outcome, &bucket_paths, &mut pool)?;
    info!(
        sorted = outcome.summary.sorted,
        skipped = outcome.summary.skipped,
        undone = outcome.summary.undone,
        remaining = outcome.summary.remaining,
        decisions = outcome.log.len(),
        "Annotation session finished"
    );

    run_result?;
    operator.write_summary(&outcome.summary)?;
    Ok(())
}
