//! CLI command implementations

pub mod config;
pub mod demo;
pub mod profiles;
pub mod transactions;

use std::future::Future;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tally_core::TallyContext;
use tracing_subscriber::EnvFilter;

/// Get the tally directory from environment or default
pub fn get_tally_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tally")
    }
}

/// Build the tally context for the current settings
pub fn get_context() -> Result<TallyContext> {
    let tally_dir = get_tally_dir();

    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;

    let ctx = TallyContext::new(&tally_dir).context("Failed to initialize tally context")?;
    if ctx.is_demo() {
        tracing::info!("demo mode: using local store in {:?}", tally_dir);
    } else {
        tracing::debug!(base_url = ?ctx.config.base_url, "using hosted backend");
    }
    Ok(ctx)
}

/// Run an async command to completion on a fresh runtime
pub fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(future)
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from warn.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}

/// Parse a JSON record body from `--data` or piped stdin
pub fn read_payload<T: DeserializeOwned>(data: Option<&str>) -> Result<T> {
    let raw = if let Some(data) = data {
        data.to_string()
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read JSON from stdin")?;
        buffer
    } else {
        anyhow::bail!("No record data provided. Use --data or pipe JSON from stdin.");
    };

    serde_json::from_str(&raw).context("Record data is not valid JSON for this command")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{ProfileDraft, TransactionDraft};

    #[test]
    fn test_read_payload_from_argument() {
        let draft: TransactionDraft =
            read_payload(Some(r#"{"amount": "12.50", "type": "expense", "category": 3}"#)).unwrap();
        assert_eq!(draft.type_c.as_deref(), Some("expense"));
        assert!(draft.amount_c.is_some());
    }

    #[test]
    fn test_read_payload_rejects_malformed_json() {
        let err = read_payload::<ProfileDraft>(Some("{not json")).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
