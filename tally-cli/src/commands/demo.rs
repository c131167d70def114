//! Demo command - switch between the hosted backend and the local demo store

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::get_tally_dir;
use crate::output;
use tally_core::adapters::demo::CATEGORY_TABLE;
use tally_core::adapters::memory::MemoryTableClient;
use tally_core::services::{DemoService, PROFILE_TABLE, TRANSACTION_TABLE};

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Reseed the demo store and use it instead of the hosted backend
    #[command(name = "on")]
    On,
    /// Go back to the hosted backend (the demo store is kept)
    #[command(name = "off")]
    Off,
    /// Show whether demo mode is active and what the store holds
    Status {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let tally_dir = get_tally_dir();
    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;
    let service = DemoService::new(&tally_dir);
    let store_path = service.store_path();

    match command.unwrap_or(DemoCommands::Status { json: false }) {
        DemoCommands::On => {
            service.enable()?;
            output::success(&format!("Demo store seeded at {}", store_path.display()));
            for (table, rows) in store_counts(&store_path)? {
                println!("  {:<16} {} row(s)", table, rows);
            }
        }
        DemoCommands::Off => {
            service.disable()?;
            output::warning("Using the hosted backend again");
            println!("  Demo store left at {}", store_path.display().to_string().dimmed());
        }
        DemoCommands::Status { json } => {
            let enabled = service.is_enabled()?;
            let counts = if store_path.exists() {
                store_counts(&store_path)?
            } else {
                Vec::new()
            };

            if json {
                let tables: serde_json::Map<String, serde_json::Value> = counts
                    .iter()
                    .map(|(table, rows)| (table.to_string(), json!(rows)))
                    .collect();
                return output::json(&json!({
                    "enabled": enabled,
                    "store": store_path,
                    "tables": tables,
                }));
            }

            let state = if enabled { "ON".green() } else { "OFF".yellow() };
            println!("Demo mode: {}", state);
            if counts.is_empty() {
                println!("  No demo store yet; run 'tally demo on'");
            } else {
                println!("  Store: {}", store_path.display());
                for (table, rows) in counts {
                    println!("  {:<16} {} row(s)", table, rows);
                }
            }
        }
    }
    Ok(())
}

fn store_counts(path: &Path) -> Result<Vec<(&'static str, usize)>> {
    let store = MemoryTableClient::load(path)
        .with_context(|| format!("Failed to read demo store: {:?}", path))?;
    [PROFILE_TABLE, CATEGORY_TABLE, TRANSACTION_TABLE]
        .into_iter()
        .map(|table| -> Result<_> { Ok((table, store.row_count(table)?)) })
        .collect()
}
