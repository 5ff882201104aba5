//! Run-scoped accumulation of classification results
//!
//! The report is a value owned by the run and handed to the rendering
//! boundary once the run completes; nothing here formats, charts, or
//! sends anything.

use serde::Serialize;

use super::classifier::{Direction, Tier};
use crate::models::{ChartPoint, MetricKind};

/// One detected deviation for a (page, metric) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    pub url: String,
    pub metric: MetricKind,
    pub mean: f64,
    pub std_dev: f64,
    pub observed: f64,
    pub tier: Tier,
    pub direction: Direction,
}

/// Date-sorted chart data for one flagged page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub url: String,
    pub points: Vec<ChartPoint>,
}

/// Accumulated results of one monitoring run
///
/// Tier-3 records land in the flagged bucket, tier 1-2 in the moderate
/// bucket; insertion order is preserved within each.
#[derive(Debug, Default, Serialize)]
pub struct AnomalyReport {
    moderate: Vec<ClassificationRecord>,
    flagged: Vec<ClassificationRecord>,
    charts: Vec<ChartSeries>,
}

impl AnomalyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its severity bucket
    pub fn record(&mut self, record: ClassificationRecord) {
        match record.tier {
            Tier::Three => self.flagged.push(record),
            Tier::One | Tier::Two => self.moderate.push(record),
        }
    }

    /// Store chart data for a flagged page; the first write per page wins
    pub fn attach_chart(&mut self, url: &str, points: Vec<ChartPoint>) {
        if self.charts.iter().any(|series| series.url == url) {
            return;
        }
        self.charts.push(ChartSeries {
            url: url.to_string(),
            points,
        });
    }

    /// Tier-1/2 records, in insertion order
    pub fn moderate(&self) -> &[ClassificationRecord] {
        &self.moderate
    }

    /// Tier-3 records, in insertion order
    pub fn flagged(&self) -> &[ClassificationRecord] {
        &self.flagged
    }

    /// Chart series for flagged pages
    pub fn charts(&self) -> &[ChartSeries] {
        &self.charts
    }

    /// Total records across both buckets
    pub fn len(&self) -> usize {
        self.moderate.len() + self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moderate.is_empty() && self.flagged.is_empty()
    }
}
