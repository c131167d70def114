//! Config command - inspect resolved settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::get_tally_dir;
use crate::output;
use tally_core::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration (public key masked)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => show(json),
    }
}

fn show(json: bool) -> Result<()> {
    let tally_dir = get_tally_dir();
    let config = Config::load(&tally_dir)?;
    let public_key = config.masked_public_key();

    if json {
        return output::json(&json!({
            "dir": tally_dir,
            "baseUrl": config.base_url,
            "projectId": config.project_id,
            "publicKey": public_key,
            "timeoutSecs": config.timeout_secs,
            "demoMode": config.demo_mode,
            "strictDeletes": config.strict_deletes,
        }));
    }

    let unset = || "(not set)".dimmed().to_string();
    println!("{}", "Configuration".bold());
    println!("  Directory:      {}", tally_dir.display());
    println!("  Base URL:       {}", config.base_url.clone().unwrap_or_else(unset));
    println!("  Project id:     {}", config.project_id.clone().unwrap_or_else(unset));
    println!("  Public key:     {}", public_key.unwrap_or_else(unset));
    println!("  Timeout:        {}s", config.timeout_secs);
    println!(
        "  Demo mode:      {}",
        if config.demo_mode { "ON".green() } else { "OFF".yellow() }
    );
    println!("  Strict deletes: {}", config.strict_deletes);
    Ok(())
}
