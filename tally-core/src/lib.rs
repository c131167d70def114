//! Tally Core - typed record services over a hosted-table backend
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: records, drafts, patches and their wire normalization
//! - **ports**: the hosted-table client trait and its wire types
//! - **services**: per-entity CRUD and the shared response rules
//! - **adapters**: HTTP client, in-memory store, demo data

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::http::HttpTableClient;
use adapters::memory::MemoryTableClient;
use config::Config;
use ports::HostedTableClient;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    Lookup, Profile, ProfileDraft, ProfilePatch, RecordId, Transaction, TransactionDraft,
    TransactionPatch,
};

/// Main context for Tally operations
///
/// Built once by the application entry point. It owns the single backend
/// client handle and the services sharing it.
pub struct TallyContext {
    pub config: Config,
    pub client: Arc<dyn HostedTableClient>,
    pub profile_service: ProfileService,
    pub transaction_service: TransactionService,
    demo_store: Option<(Arc<MemoryTableClient>, std::path::PathBuf)>,
}

impl TallyContext {
    /// Create a context from the settings in `tally_dir`
    ///
    /// Demo mode uses the persisted in-memory store; otherwise the hosted
    /// backend is reached over HTTP.
    pub fn new(tally_dir: &Path) -> Result<Self> {
        let config = Config::load(tally_dir)?;

        if config.demo_mode {
            let path = DemoService::new(tally_dir).store_path();
            let store = Arc::new(
                MemoryTableClient::load(&path)
                    .with_context(|| format!("Failed to load demo store: {:?}", path))?,
            );
            let mut ctx = Self::with_client(config, store.clone());
            ctx.demo_store = Some((store, path));
            return Ok(ctx);
        }

        let settings = config.http_settings()?;
        let client = Arc::new(HttpTableClient::new(&settings)?);
        Ok(Self::with_client(config, client))
    }

    /// Create a context around an existing client
    pub fn with_client(config: Config, client: Arc<dyn HostedTableClient>) -> Self {
        let policy = config.batch_policy();
        let profile_service = ProfileService::new(Arc::clone(&client), policy);
        let transaction_service = TransactionService::new(Arc::clone(&client), policy);

        Self {
            config,
            client,
            profile_service,
            transaction_service,
            demo_store: None,
        }
    }

    /// Write demo changes back to disk; a no-op against the hosted backend
    pub fn persist(&self) -> Result<()> {
        if let Some((store, path)) = &self.demo_store {
            store
                .save(path)
                .with_context(|| format!("Failed to save demo store: {:?}", path))?;
        }
        Ok(())
    }

    pub fn is_demo(&self) -> bool {
        self.demo_store.is_some()
    }
}
