//! `triage sanitize`

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use triage_common::logging::generate_run_id;
use triage_common::stage_span;
use triage_common::Config;
use triage_core::{SanitizeReport, Sanitizer, SourceKind};

use super::path_or;

#[derive(Args, Debug, Default)]
pub struct SanitizeArgs {
    /// Raw post export
    #[arg(long)]
    pub posts: Option<PathBuf>,
    /// Raw comment export
    #[arg(long)]
    pub comments: Option<PathBuf>,
    /// Where to write sanitized posts
    #[arg(long)]
    pub out_posts: Option<PathBuf>,
    /// Where to write sanitized comments
    #[arg(long)]
    pub out_comments: Option<PathBuf>,
}

pub fn run(config: &Config, args: &SanitizeArgs) -> Result<()> {
    let run_id = generate_run_id();
    let span = stage_span!("sanitize", run_id);
    let _enter = span.enter();

    let paths = &config.paths;
    let sanitizer = Sanitizer::new(&config.sanitizer);

    let jobs = [
        (
            SourceKind::Post,
            path_or(args.posts.as_deref(), config, &paths.raw_posts),
            path_or(args.out_posts.as_deref(), config, &paths.sanitized_posts),
        ),
        (
            SourceKind::Comment,
            path_or(args.comments.as_deref(), config, &paths.raw_comments),
            path_or(args.out_comments.as_deref(), config, &paths.sanitized_comments),
        ),
    ];

    for (kind, input, output) in jobs {
        let report = sanitizer.sanitize_file(kind, &input, &output)?;
        print_report(kind, &report, &output);
    }
    Ok(())
}

fn print_report(kind: SourceKind, report: &SanitizeReport, output: &std::path::Path) {
    println!(
        "{:<9} kept {:>6} of {:>6}  (removed {}, too short {}, malformed {})  -> {}",
        format!("{kind}s:"),
        report.kept,
        report.read,
        report.removed,
        report.too_short,
        report.malformed,
        output.display()
    );
}
