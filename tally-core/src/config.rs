//! Configuration management
//!
//! Settings live in `settings.json` inside the tally directory:
//! ```json
//! {
//!   "backend": { "baseUrl": "...", "projectId": "...", "publicKey": "...", "timeoutSecs": 30 },
//!   "app": { "demoMode": false, "strictDeletes": false, ... }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::adapters::http::{HttpClientSettings, DEFAULT_TIMEOUT_SECS};
use crate::domain::result::Error;
use crate::services::BatchFailurePolicy;

pub const PROJECT_ID_ENV: &str = "TALLY_PROJECT_ID";
pub const PUBLIC_KEY_ENV: &str = "TALLY_PUBLIC_KEY";
pub const BASE_URL_ENV: &str = "TALLY_BASE_URL";
pub const DEMO_MODE_ENV: &str = "TALLY_DEMO_MODE";
pub const STRICT_DELETES_ENV: &str = "TALLY_STRICT_DELETES";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    backend: BackendSettings,
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default)]
    strict_deletes: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Tally configuration (resolved view of settings plus environment)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout_secs: u64,
    pub demo_mode: bool,
    pub strict_deletes: bool,
    /// App flags whose current value came from the environment
    env_flags: EnvFlags,
}

#[derive(Debug, Clone, Copy, Default)]
struct EnvFlags {
    demo_mode: bool,
    strict_deletes: bool,
}

impl Config {
    /// Load config from the tally directory
    ///
    /// Environment variables override the file:
    /// `TALLY_PROJECT_ID`, `TALLY_PUBLIC_KEY`, `TALLY_BASE_URL`,
    /// `TALLY_DEMO_MODE`, `TALLY_STRICT_DELETES`.
    pub fn load(tally_dir: &Path) -> Result<Self> {
        Self::load_with_env(tally_dir, |name| std::env::var(name).ok())
    }

    fn load_with_env(tally_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(tally_dir)?;

        let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let demo_env = parse_flag(lookup(DEMO_MODE_ENV).as_deref());
        let strict_env = parse_flag(lookup(STRICT_DELETES_ENV).as_deref());

        Ok(Self {
            base_url: env(BASE_URL_ENV).or(raw.backend.base_url),
            project_id: env(PROJECT_ID_ENV).or(raw.backend.project_id),
            public_key: env(PUBLIC_KEY_ENV).or(raw.backend.public_key),
            timeout_secs: raw.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            demo_mode: demo_env.unwrap_or(raw.app.demo_mode),
            strict_deletes: strict_env.unwrap_or(raw.app.strict_deletes),
            env_flags: EnvFlags {
                demo_mode: demo_env.is_some(),
                strict_deletes: strict_env.is_some(),
            },
        })
    }

    /// Save config to the tally directory
    ///
    /// Only the app flags are written, and only those not taken from the
    /// environment; credentials and other settings are left as they are.
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        let settings_path = tally_dir.join("settings.json");
        let mut settings = read_settings(tally_dir)?;

        if !self.env_flags.demo_mode {
            settings.app.demo_mode = self.demo_mode;
        }
        if !self.env_flags.strict_deletes {
            settings.app.strict_deletes = self.strict_deletes;
        }

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Turn demo mode on; an explicit toggle is saved even over the environment
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
        self.env_flags.demo_mode = false;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
        self.env_flags.demo_mode = false;
    }

    pub fn batch_policy(&self) -> BatchFailurePolicy {
        if self.strict_deletes {
            BatchFailurePolicy::Strict
        } else {
            BatchFailurePolicy::Lenient
        }
    }

    /// Connection settings for the HTTP client
    pub fn http_settings(&self) -> std::result::Result<HttpClientSettings, Error> {
        let missing = |what: &str, env: &str| {
            Error::config(format!("{} is not set (settings.json or {})", what, env))
        };
        Ok(HttpClientSettings {
            base_url: self
                .base_url
                .clone()
                .ok_or_else(|| missing("backend base URL", BASE_URL_ENV))?,
            project_id: self
                .project_id
                .clone()
                .ok_or_else(|| missing("project id", PROJECT_ID_ENV))?,
            public_key: self
                .public_key
                .clone()
                .ok_or_else(|| missing("public key", PUBLIC_KEY_ENV))?,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    /// Public key with all but the last four characters masked
    ///
    /// Keys of four characters or fewer are masked entirely.
    pub fn masked_public_key(&self) -> Option<String> {
        self.public_key.as_ref().map(|key| {
            if key.chars().count() <= 4 {
                return "****".to_string();
            }
            let visible: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", visible)
        })
    }
}

fn read_settings(tally_dir: &Path) -> Result<SettingsFile> {
    let settings_path = tally_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_settings_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{
                "backend": {"baseUrl": "https://tables.example.com", "projectId": "p1", "publicKey": "pk_abcdef", "timeoutSecs": 5},
                "app": {"strictDeletes": true}
            }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.batch_policy(), BatchFailurePolicy::Strict);
        assert_eq!(config.masked_public_key().as_deref(), Some("****cdef"));

        let http = config.http_settings().unwrap();
        assert_eq!(http.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.batch_policy(), BatchFailurePolicy::Lenient);
    }

    #[test]
    fn test_http_settings_require_credentials() {
        let config = Config {
            base_url: Some("https://tables.example.com".to_string()),
            ..Default::default()
        };
        let err = config.http_settings().unwrap_err();
        assert!(err.to_string().contains("project id"));
    }

    #[test]
    fn test_short_public_key_fully_masked() {
        let config = Config {
            public_key: Some("abcd".to_string()),
            ..Default::default()
        };
        assert_eq!(config.masked_public_key().as_deref(), Some("****"));
    }

    #[test]
    fn test_env_flags_are_not_written_back() {
        let dir = TempDir::new().unwrap();
        let env = |name: &str| (name == STRICT_DELETES_ENV).then(|| "true".to_string());

        let mut config = Config::load_with_env(dir.path(), env).unwrap();
        assert_eq!(config.batch_policy(), BatchFailurePolicy::Strict);
        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("settings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["demoMode"], serde_json::json!(true));
        assert_eq!(saved["app"]["strictDeletes"], serde_json::json!(false));

        let reloaded = Config::load_with_env(dir.path(), |_| None).unwrap();
        assert!(reloaded.demo_mode);
        assert!(!reloaded.strict_deletes);
    }

    #[test]
    fn test_save_preserves_unmanaged_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"backend": {"projectId": "p1"}, "app": {"theme": "dark"}, "extra": 1}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("settings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["demoMode"], serde_json::json!(true));
        assert_eq!(saved["app"]["theme"], serde_json::json!("dark"));
        assert_eq!(saved["backend"]["projectId"], serde_json::json!("p1"));
        assert_eq!(saved["extra"], serde_json::json!(1));
    }
}
