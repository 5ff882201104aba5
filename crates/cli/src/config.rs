//! Monitor configuration
//!
//! Everything beyond the property URI comes from `STM_`-prefixed
//! environment variables, with defaults carried over from the original
//! monitoring job.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime settings for one monitoring run
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// OAuth bearer token with read access to the property
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Search Analytics API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Days the observation date lags today, covering the source's
    /// reporting delay
    #[serde(default = "default_recent_offset")]
    pub recent_offset: u32,

    /// Full lookback in days, bounding the baseline start
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Upper cap on rows per query
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,

    /// Cool-down between retry attempts, in seconds
    #[serde(default = "default_retry_cooldown")]
    pub retry_cooldown_secs: u64,

    /// Path fragments that exclude a page when contained in its URL
    #[serde(default = "default_excluded_fragments")]
    pub excluded_fragments: Vec<String>,
}

fn default_api_url() -> String {
    "https://www.googleapis.com/webmasters/v3".to_string()
}

fn default_recent_offset() -> u32 {
    2
}

fn default_lookback_days() -> u32 {
    60
}

fn default_row_limit() -> u32 {
    5000
}

fn default_retry_cooldown() -> u64 {
    60
}

fn default_excluded_fragments() -> Vec<String> {
    ["/online-threats/", "/security_response/", "/support/"]
        .iter()
        .map(|fragment| fragment.to_string())
        .collect()
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            auth_token: None,
            api_url: default_api_url(),
            recent_offset: default_recent_offset(),
            lookback_days: default_lookback_days(),
            row_limit: default_row_limit(),
            retry_cooldown_secs: default_retry_cooldown(),
            excluded_fragments: default_excluded_fragments(),
        }
    }
}

impl MonitorSettings {
    /// Load settings from the environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("STM")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("excluded_fragments"),
            )
            .build()
            .context("Failed to read environment configuration")?;

        settings
            .try_deserialize()
            .context("Invalid monitor configuration")
    }

    /// Bearer token, required before any API call goes out
    pub fn require_auth_token(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .context("STM_AUTH_TOKEN is not set; provide an OAuth bearer token with read access to the property")
    }
}
