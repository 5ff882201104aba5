//! Day-over-day anomaly detection for per-page search traffic
//!
//! This crate provides the core pipeline for the search traffic monitor:
//! - Windowed metric queries with bounded fixed-backoff retry
//! - Substring-blacklist filtering of uninteresting pages
//! - Per-page baseline/observation series assembly
//! - Tiered deviation classification (1/2/3 population stdevs)
//! - Run-scoped accumulation into moderate and flagged buckets

pub mod anomaly;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod run;
pub mod series;

pub use anomaly::{
    AnomalyReport, Assessment, BaselineStats, ChartSeries, ClassificationRecord, Deviation,
    Direction, Tier, TieredClassifier,
};
pub use error::{FetchError, WindowError};
pub use filter::UrlFilter;
pub use models::{ChartPoint, DateWindows, MetricKind, MetricRow, TimeWindow};
pub use query::{ClientConfig, MetricSource, RetryPolicy, SearchConsoleClient};
pub use run::{CancelFlag, MonitorPipeline};
pub use series::{MetricSeries, PageSeries, SeriesBuilder};
