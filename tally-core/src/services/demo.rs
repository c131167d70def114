//! Demo service - manage demo mode
//!
//! Demo mode swaps the hosted backend for an in-memory store persisted to
//! `demo.json`, seeded with sample profiles and transactions.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;

use crate::adapters::demo;
use crate::adapters::memory::MemoryTableClient;
use crate::config::Config;

/// File holding the demo store snapshot
pub const DEMO_STORE_FILE: &str = "demo.json";

/// Demo service for managing demo mode
pub struct DemoService {
    tally_dir: PathBuf,
}

impl DemoService {
    pub fn new(tally_dir: &Path) -> Self {
        Self {
            tally_dir: tally_dir.to_path_buf(),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.tally_dir.join(DEMO_STORE_FILE)
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.tally_dir)?;
        Ok(config.demo_mode)
    }

    /// Enable demo mode with a freshly seeded store
    pub fn enable(&self) -> Result<()> {
        let store_path = self.store_path();
        if store_path.exists() {
            std::fs::remove_file(&store_path)?;
        }

        let mut config = Config::load(&self.tally_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.tally_dir)?;

        let store = MemoryTableClient::new();
        demo::seed(&store, Utc::now().date_naive())?;
        store.save(&store_path)?;
        Ok(())
    }

    /// Disable demo mode; the demo store is left on disk
    pub fn disable(&self) -> Result<()> {
        let mut config = Config::load(&self.tally_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.tally_dir)?;
        Ok(())
    }
}
