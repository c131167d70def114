//! Transactions command - CRUD on transaction records

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, read_payload};
use crate::output;
use tally_core::{RecordId, Transaction, TransactionDraft, TransactionPatch};

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one transaction
    Get {
        id: RecordId,
        #[arg(long)]
        json: bool,
    },
    /// Create a transaction from JSON (--data or stdin)
    Create {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change the fields given in JSON, keeping the rest
    Update {
        id: RecordId,
        #[arg(long)]
        data: Option<String>,
        /// Rewrite the whole record; omitted fields are cleared
        #[arg(long)]
        replace: bool,
        #[arg(long)]
        json: bool,
    },
    /// Delete a transaction
    Delete { id: RecordId },
}

pub async fn run(command: TransactionCommands) -> Result<()> {
    let ctx = get_context()?;
    let service = &ctx.transaction_service;

    match command {
        TransactionCommands::List { json } => {
            let transactions = service.get_all().await?;
            if json {
                return output::json(&transactions);
            }
            if transactions.is_empty() {
                output::warning("No transactions found");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["Id", "Date", "Name", "Type", "Category", "Amount"]);
            let mut net = 0.0;
            for tx in &transactions {
                net += tx.signed_amount();
                table.add_row(vec![
                    tx.id.to_string(),
                    output::cell(tx.date_c.as_deref()),
                    output::cell(tx.name.as_deref()),
                    output::cell(tx.type_c.as_deref()),
                    tx.category_c
                        .as_ref()
                        .map(|c| c.label())
                        .unwrap_or_else(|| "-".to_string()),
                    format_signed(tx),
                ]);
            }
            println!("{}", table);
            println!(
                "{} transaction(s), net {}",
                transactions.len(),
                output::format_amount(Some(net))
            );
        }
        TransactionCommands::Get { id, json } => match service.get_by_id(id).await? {
            Some(tx) if json => output::json(&tx)?,
            Some(tx) => print_transaction(&tx),
            None => anyhow::bail!("Transaction {} not found", id),
        },
        TransactionCommands::Create { data, json } => {
            let draft: TransactionDraft = read_payload(data.as_deref())?;
            let created = service.create(&draft).await?;
            ctx.persist()?;
            report_write(created, json, "Created")?;
        }
        TransactionCommands::Update {
            id,
            data,
            replace,
            json,
        } => {
            let patch: TransactionPatch = read_payload(data.as_deref())?;
            let updated = if replace {
                service.update(id, &patch).await?
            } else {
                match service.amend(id, &patch).await? {
                    Some(tx) => Some(tx),
                    None => anyhow::bail!("Transaction {} not found", id),
                }
            };
            ctx.persist()?;
            report_write(updated, json, "Updated")?;
        }
        TransactionCommands::Delete { id } => {
            service.delete(id).await?;
            ctx.persist()?;
            output::success(&format!("Deleted transaction {}", id));
        }
    }

    Ok(())
}

fn format_signed(tx: &Transaction) -> String {
    let text = output::format_amount(tx.amount_c.map(f64::abs));
    if tx.is_expense() {
        format!("-{}", text).red().to_string()
    } else if tx.is_income() {
        format!("+{}", text).green().to_string()
    } else {
        text
    }
}

fn report_write(tx: Option<Transaction>, json: bool, verb: &str) -> Result<()> {
    match tx {
        Some(tx) if json => output::json(&tx),
        Some(tx) => {
            output::success(&format!("{} transaction {}", verb, tx.id));
            print_transaction(&tx);
            Ok(())
        }
        None => {
            output::warning(&format!("{} transaction; the backend returned no record", verb));
            Ok(())
        }
    }
}

fn print_transaction(tx: &Transaction) {
    println!("{} {}", "Transaction".bold(), tx.id);
    println!("  Name:        {}", output::cell(tx.name.as_deref()));
    println!("  Amount:      {}", format_signed(tx));
    println!("  Type:        {}", output::cell(tx.type_c.as_deref()));
    println!(
        "  Category:    {}",
        tx.category_c
            .as_ref()
            .map(|c| c.label())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Description: {}", output::cell(tx.description_c.as_deref()));
    println!("  Date:        {}", output::cell(tx.date_c.as_deref()));
    println!("  Created at:  {}", output::cell(tx.created_at_c.as_deref()));
}
