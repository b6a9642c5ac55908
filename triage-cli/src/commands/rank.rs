//! `triage rank`

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use triage_common::logging::generate_run_id;
use triage_common::stage_span;
use triage_common::util::{single_line, truncate_with_ellipsis};
use triage_common::Config;
use triage_core::{rank_files, CandidateQueue, PoolFile, RankReport};

use super::{load_scorer, path_or};

/// Candidates listed after a ranking run.
const PREVIEW_COUNT: usize = 5;

#[derive(Args, Debug, Default)]
pub struct RankArgs {
    /// Sanitized posts
    #[arg(long)]
    pub posts: Option<PathBuf>,
    /// Sanitized comments
    #[arg(long)]
    pub comments: Option<PathBuf>,
    /// Where to write the ranked snapshot
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Replace an existing working pool with the fresh ranking
    #[arg(long)]
    pub reset_pool: bool,
}

pub fn run(config: &Config, args: &RankArgs) -> Result<()> {
    let run_id = generate_run_id();
    let span = stage_span!("rank", run_id);
    let _enter = span.enter();

    let paths = &config.paths;
    let posts = path_or(args.posts.as_deref(), config, &paths.sanitized_posts);
    let comments = path_or(args.comments.as_deref(), config, &paths.sanitized_comments);
    let snapshot = path_or(args.out.as_deref(), config, &paths.ranked);
    let pool = paths.resolve(&paths.pool);

    let scorer = load_scorer(config)?;
    let (queue, report) = rank_files(&scorer, &posts, &comments)?;
    queue.save(&snapshot)?;
    info!(path = %snapshot.display(), candidates = queue.len(), "Wrote ranked snapshot");

    let seeded = seed_pool(&queue, &pool, args.reset_pool)?;

    print_report(&report, &snapshot);
    print_preview(&queue);
    if seeded {
        println!("Working pool seeded: {}", pool.display());
    } else {
        println!(
            "Working pool kept: {} (use --reset-pool to replace it)",
            pool.display()
        );
    }
    Ok(())
}

/// Write the pool from the fresh ranking unless one exists and `reset` is off.
///
/// An existing pool is rewritten under its lock so a running session is
/// never truncated underneath.
fn seed_pool(queue: &CandidateQueue, pool: &Path, reset: bool) -> Result<bool> {
    if !pool.exists() {
        queue.save(pool)?;
    } else if reset {
        PoolFile::open(pool)?.rewrite(queue.records())?;
    } else {
        info!(path = %pool.display(), "Working pool already exists, leaving it untouched");
        return Ok(false);
    }
    info!(path = %pool.display(), candidates = queue.len(), "Seeded working pool");
    Ok(true)
}

fn print_report(report: &RankReport, snapshot: &Path) {
    println!(
        "Ranked {} candidates from {} records (duplicates {}, irrelevant {}, malformed {})  -> {}",
        report.accepted,
        report.offered,
        report.duplicates,
        report.irrelevant,
        report.malformed,
        snapshot.display()
    );
}

fn print_preview(queue: &CandidateQueue) {
    for record in queue.records().iter().take(PREVIEW_COUNT) {
        println!(
            "  {:>8.4}  {:<10}  {}",
            record.score_or_zero(),
            record.id,
            truncate_with_ellipsis(&single_line(&record.body), 60)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use triage_core::Record;

    fn queue(ids: &[&str]) -> CandidateQueue {
        CandidateQueue::new(
            ids.iter()
                .map(|id| Record::new(*id, "a", "s", "b").with_score(1.0))
                .collect(),
        )
    }

    fn pool_ids(path: &Path) -> Vec<String> {
        CandidateQueue::load(path)
            .unwrap()
            .records()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    #[test]
    fn seeds_missing_pool() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("pool.csv");
        assert!(seed_pool(&queue(&["A"]), &pool, false).unwrap());
        assert_eq!(pool_ids(&pool), vec!["A"]);
    }

    #[test]
    fn keeps_existing_pool_without_reset() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("pool.csv");
        queue(&["old"]).save(&pool).unwrap();
        assert!(!seed_pool(&queue(&["A", "B"]), &pool, false).unwrap());
        assert_eq!(pool_ids(&pool), vec!["old"]);
    }

    #[test]
    fn reset_replaces_existing_pool() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("pool.csv");
        queue(&["old", "older"]).save(&pool).unwrap();
        assert!(seed_pool(&queue(&["A"]), &pool, true).unwrap());
        assert_eq!(pool_ids(&pool), vec!["A"]);
    }
}
