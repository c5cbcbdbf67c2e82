// src/config.rs
//! Service configuration: fixed wall-clock timeouts, user agent, and the
//! quote-API key. Loaded from a TOML file with env overrides; every field
//! has a sane default so the service boots with no config at all.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/aggregator.toml";
pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const ENV_QUOTE_API_KEY: &str = "QUOTE_API_KEY";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Stateless document-fetch timeout, seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Browser-session navigation timeout, seconds.
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,
    /// User agent sent on stateless fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Alpha Vantage API key for the primary quote endpoint.
    #[serde(default = "default_quote_api_key")]
    pub quote_api_key: String,
    /// Cap on news articles per aggregation run.
    #[serde(default = "default_max_articles")]
    pub max_news_articles: usize,
    /// Cap on extracted product/service names.
    #[serde(default = "default_max_products")]
    pub max_products: usize,
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_nav_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_quote_api_key() -> String {
    "demo".to_string()
}
fn default_max_articles() -> usize {
    5
}
fn default_max_products() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str("").expect("defaults deserialize")
    }
}

impl AppConfig {
    /// Load from an explicit TOML path.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config at {}: {}", path.display(), e))?;
        let mut cfg: AppConfig = toml::from_str(&content)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Load using `$AGGREGATOR_CONFIG_PATH`, then `config/aggregator.toml`,
    /// then built-in defaults. A missing file is not an error.
    pub fn load() -> Self {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        match Self::from_path(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!(error = %e, "no config file loaded, using defaults");
                let mut cfg = Self::default();
                cfg.apply_env();
                cfg
            }
        }
    }

    /// Env overrides win over file values.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_QUOTE_API_KEY) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.quote_api_key = key;
            }
        }
    }
}
