//! Core data models for the traffic monitor

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::WindowError;

/// Metric dimensions reported per page by the search analytics source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Clicks,
    Impressions,
}

impl MetricKind {
    /// Both metrics, in report order
    pub const ALL: [MetricKind; 2] = [MetricKind::Clicks, MetricKind::Impressions];

    /// Label used in report tables
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Clicks => "Clicks",
            MetricKind::Impressions => "Impressions",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One dated per-page measurement returned by the metric source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub date: NaiveDate,
    pub url: String,
    pub clicks: u64,
    pub impressions: u64,
}

impl MetricRow {
    /// Value of the given metric, as a float for the statistics
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Clicks => self.clicks as f64,
            MetricKind::Impressions => self.impressions as f64,
        }
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Window spanning `start..=end`; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "window start after end");
        Self { start, end }
    }

    /// Window covering a single day
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }
}

/// The date anchors of one monitoring run
///
/// Derived from "today" minus two configured offsets. The observation day
/// lags today by the source's reporting delay; the baseline ends one day
/// before the observation so the day under test never leaks into its own
/// statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindows {
    /// Day under test, held out of the baseline
    pub observation: NaiveDate,
    /// Last day included in the baseline (observation minus one)
    pub baseline_exclusion: NaiveDate,
    /// First day of the baseline window
    pub baseline_start: NaiveDate,
}

impl DateWindows {
    /// Derive the run windows from `today`
    ///
    /// `recent_offset` is how many days the observation lags today;
    /// `lookback_days` bounds the baseline start. The lookback must reach
    /// past the observation offset or there is no baseline at all.
    pub fn for_run(
        today: NaiveDate,
        recent_offset: u32,
        lookback_days: u32,
    ) -> Result<Self, WindowError> {
        if lookback_days <= recent_offset {
            return Err(WindowError {
                recent_offset,
                lookback_days,
            });
        }

        let observation = today - chrono::Duration::days(recent_offset as i64);
        Ok(Self {
            observation,
            baseline_exclusion: observation - chrono::Duration::days(1),
            baseline_start: today - chrono::Duration::days(lookback_days as i64),
        })
    }

    /// Single-day window for the observation date
    pub fn observation_window(&self) -> TimeWindow {
        TimeWindow::single_day(self.observation)
    }

    /// Baseline window, ending the day before the observation
    pub fn baseline_window(&self) -> TimeWindow {
        TimeWindow::new(self.baseline_start, self.baseline_exclusion)
    }
}

/// Date-keyed point for chart rendering of flagged pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
}
