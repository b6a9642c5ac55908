//! `triage config`

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::Path;

use triage_common::config::config_path;
use triage_common::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_command(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
        ConfigCommands::Init { force } => init(None, force),
    }
}

/// Write defaults to `path`, or to the default location.
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
