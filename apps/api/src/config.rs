use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Endpoint of the HTML → PDF rendering service.
    pub render_service_url: String,
    pub render_timeout: Duration,
    /// Snapshots go to Redis when set, otherwise to `snapshot_dir`.
    pub redis_url: Option<String>,
    pub snapshot_dir: PathBuf,
    pub autosave_enabled: bool,
    pub restore_on_start: bool,
    /// How long a removed entry lingers before it is detached. Zero removes
    /// immediately.
    pub removal_grace: Duration,
    pub autosave_debounce: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            render_service_url: var("RENDER_SERVICE_URL", "http://localhost:3000/render"),
            render_timeout: Duration::from_secs(
                var("RENDER_TIMEOUT_SECS", "60")
                    .parse::<u64>()
                    .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
            snapshot_dir: PathBuf::from(var("SNAPSHOT_DIR", "./data")),
            autosave_enabled: parse_flag("AUTOSAVE_ENABLED", &var("AUTOSAVE_ENABLED", "false"))?,
            restore_on_start: parse_flag("RESTORE_ON_START", &var("RESTORE_ON_START", "false"))?,
            removal_grace: Duration::from_millis(
                var("REMOVAL_GRACE_MS", "300")
                    .parse::<u64>()
                    .context("REMOVAL_GRACE_MS must be a whole number of milliseconds")?,
            ),
            autosave_debounce: Duration::from_millis(
                var("AUTOSAVE_DEBOUNCE_MS", "1000")
                    .parse::<u64>()
                    .context("AUTOSAVE_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}
