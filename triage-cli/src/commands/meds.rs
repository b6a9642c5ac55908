//! `triage meds`

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use triage_common::logging::generate_run_id;
use triage_common::stage_span;
use triage_common::Config;
use triage_core::{MedicationReport, MedicationScanner, SourceKind};

use super::path_or;

#[derive(Args, Debug, Default)]
pub struct MedsArgs {
    /// Sanitized posts
    #[arg(long)]
    pub posts: Option<PathBuf>,
    /// Sanitized comments
    #[arg(long)]
    pub comments: Option<PathBuf>,
    /// Medication name list
    #[arg(long)]
    pub names: Option<PathBuf>,
}

pub fn run(config: &Config, args: &MedsArgs) -> Result<()> {
    let run_id = generate_run_id();
    let span = stage_span!("meds", run_id);
    let _enter = span.enter();

    let paths = &config.paths;
    let names = path_or(args.names.as_deref(), config, &paths.medication_names);
    let scanner = MedicationScanner::load(&names)?;

    let posts = path_or(args.posts.as_deref(), config, &paths.sanitized_posts);
    let comments = path_or(args.comments.as_deref(), config, &paths.sanitized_comments);

    for (kind, path) in [(SourceKind::Post, posts), (SourceKind::Comment, comments)] {
        let report = scanner.scan_file(kind, &path)?;
        print_report(kind, &report);
    }
    Ok(())
}

fn print_report(kind: SourceKind, report: &MedicationReport) {
    for hit in &report.hits {
        println!("{:<8} {:<12} {}", kind.label(), hit.id, hit.medication);
    }
    println!(
        "{} of {} {}s mention a medication",
        report.hits.len(),
        report.scanned,
        kind
    );
    println!();
}
