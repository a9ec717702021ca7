//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the provider API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub sports: SportsConfig,
    pub store: StoreConfig,
}

/// Odds/scores provider (The Odds API) settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key_env: String,
    /// Comma-separated provider regions, e.g. "us".
    pub regions: String,
    /// Comma-separated market keys, e.g. "h2h,spreads,totals".
    pub markets: String,
    pub odds_format: String,
    /// Bookmaker preferred when normalizing a payload; falls back to the
    /// first bookmaker present.
    pub preferred_bookmaker: String,
    pub timeout_secs: u64,
    /// `daysFrom` window for the scores endpoint.
    pub scores_days_from: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SportsConfig {
    pub default_sport: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Path of the JSON snapshot file.
    pub state_file: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
