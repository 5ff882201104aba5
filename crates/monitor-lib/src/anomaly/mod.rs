//! Tiered anomaly detection over per-page traffic series
//!
//! This module provides:
//! - Population mean/stdev statistics for baseline windows
//! - A three-tier classifier evaluated most severe first
//! - The run-scoped report the classifications accumulate into

mod classifier;
mod report;

pub use classifier::{Assessment, BaselineStats, Deviation, Direction, Tier, TieredClassifier};
pub use report::{AnomalyReport, ChartSeries, ClassificationRecord};
