//! Tally CLI - profiles and transactions on a hosted-table backend

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{config, demo, profiles, transactions};

/// Tally - manage profiles and transactions from your terminal
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    /// Log backend requests (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage profiles
    Profiles {
        #[command(subcommand)]
        command: profiles::ProfileCommands,
    },

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        command: transactions::TransactionCommands,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Profiles { command } => commands::block_on(profiles::run(command)),
        Commands::Transactions { command } => commands::block_on(transactions::run(command)),
        Commands::Demo { command } => demo::run(command),
        Commands::Config { command } => config::run(command),
    }
}
