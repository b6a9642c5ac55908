#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use triage_common::logging::init_logging;
use triage_common::Config;

mod commands;
mod terminal;

use commands::{annotate, config as config_cmd, meds, rank, sanitize};

/// `triage` - find and hand-label self-disclosures in forum exports.
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(about = "Sanitize, score, rank, and annotate forum records.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.triage/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative data paths
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// pretty or json
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drop removed and near-empty records from the raw exports
    Sanitize(sanitize::SanitizeArgs),

    /// Score, deduplicate, and rank the sanitized exports
    Rank(rank::RankArgs),

    /// Sanitize then rank in one go
    Prepare {
        /// Replace an existing working pool with the fresh ranking
        #[arg(long)]
        reset_pool: bool,
    },

    /// Label records from the working pool, one at a time
    Annotate(annotate::AnnotateArgs),

    /// List sanitized records that mention a medication
    Meds(meds::MedsArgs),

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        config_command: config_cmd::ConfigCommands,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir.clone_from(dir);
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.observability.log_format.clone_from(format);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init` must work even when the current file does not parse.
    if let Commands::Config {
        config_command: config_cmd::ConfigCommands::Init { force },
    } = &cli.command
    {
        let mut defaults = Config::default();
        cli.apply_overrides(&mut defaults);
        init_logging(
            &defaults.observability.log_level,
            &defaults.observability.log_format,
        );
        return config_cmd::init(cli.config.as_deref(), *force);
    }

    let mut config = Config::load_with_env(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    match cli.command {
        Commands::Sanitize(args) => sanitize::run(&config, &args),
        Commands::Rank(args) => rank::run(&config, &args),
        Commands::Prepare { reset_pool } => {
            sanitize::run(&config, &sanitize::SanitizeArgs::default())?;
            rank::run(
                &config,
                &rank::RankArgs {
                    reset_pool,
                    ..rank::RankArgs::default()
                },
            )
        }
        Commands::Annotate(args) => annotate::run(&config, &args),
        Commands::Meds(args) => meds::run(&config, &args),
        Commands::Config { config_command } => config_cmd::handle_command(config_command, &config),
    }
}
