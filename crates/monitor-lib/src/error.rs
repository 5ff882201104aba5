//! Error taxonomy for the monitoring pipeline
//!
//! A fetch failure is either transient (eligible for one fixed-delay
//! retry) or fatal. "No rows" is not an error at all: the query layer
//! returns an empty row set and the caller skips the page.

use thiserror::Error;

use crate::query::Transient;

/// Failure of a metric source request
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, mid-body abort)
    #[error("search analytics request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the API
    #[error("search analytics API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response row the client could not interpret
    #[error("malformed response row: {0}")]
    Malformed(String),

    /// The configured endpoint does not parse as a URL
    #[error("invalid API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl Transient for FetchError {
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(err) => !(err.is_builder() || err.is_decode()),
            FetchError::Api { status, .. } => *status == 429 || *status >= 500,
            FetchError::Malformed(_) | FetchError::InvalidEndpoint(_) => false,
        }
    }
}

/// Invalid lookback configuration for deriving the run windows
#[derive(Debug, Error, PartialEq, Eq)]
#[error("lookback of {lookback_days} days must extend past the {recent_offset}-day observation offset")]
pub struct WindowError {
    pub recent_offset: u32,
    pub lookback_days: u32,
}
