//! Metric source access
//!
//! This module provides:
//! - The `MetricSource` seam the rest of the pipeline queries through
//! - A Search Analytics HTTP client with bearer-token auth
//! - A bounded fixed-backoff retry wrapper for transient failures

mod client;
mod retry;

pub use client::{ClientConfig, SearchConsoleClient};
pub use retry::{with_retry, RetryPolicy, Transient};

use crate::error::FetchError;
use crate::models::{MetricRow, TimeWindow};

pub use async_trait::async_trait;

/// Source of dated per-page metric rows
///
/// `page` restricts results to an exact URL match; `None` returns every
/// page in the window (the catalog query).
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(
        &self,
        window: TimeWindow,
        page: Option<&str>,
    ) -> Result<Vec<MetricRow>, FetchError>;
}
