//! Per-page series assembly
//!
//! For one page, fetches the held-out observation day and the trailing
//! baseline window, and splits the rows into per-metric value sequences.
//! The observation value never enters the baseline.

use tracing::debug;

use crate::error::FetchError;
use crate::models::{ChartPoint, DateWindows, MetricKind, MetricRow};
use crate::query::MetricSource;

/// Baseline values plus the held-out observation for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub kind: MetricKind,
    /// Baseline values in row arrival order
    pub baseline: Vec<f64>,
    /// Held-out value from the observation date
    pub observed: f64,
}

/// Assembled series for one page
#[derive(Debug, Clone)]
pub struct PageSeries {
    url: String,
    clicks: MetricSeries,
    impressions: MetricSeries,
    baseline_rows: Vec<MetricRow>,
    observation_row: MetricRow,
}

impl PageSeries {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Series for the given metric
    pub fn metric(&self, kind: MetricKind) -> &MetricSeries {
        match kind {
            MetricKind::Clicks => &self.clicks,
            MetricKind::Impressions => &self.impressions,
        }
    }

    /// Date-sorted points covering the baseline and the observation day
    ///
    /// Statistics are order-independent; this view exists for chart
    /// rendering of flagged pages.
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        let mut points: Vec<ChartPoint> = self
            .baseline_rows
            .iter()
            .chain(std::iter::once(&self.observation_row))
            .map(|row| ChartPoint {
                date: row.date,
                clicks: row.clicks,
                impressions: row.impressions,
            })
            .collect();
        points.sort_by_key(|point| point.date);
        points
    }
}

/// Builds per-page series from a metric source
pub struct SeriesBuilder<'a, S: MetricSource + ?Sized> {
    source: &'a S,
    windows: DateWindows,
}

impl<'a, S: MetricSource + ?Sized> SeriesBuilder<'a, S> {
    pub fn new(source: &'a S, windows: DateWindows) -> Self {
        Self { source, windows }
    }

    /// Assemble the series for one page
    ///
    /// `Ok(None)` means the page has no signal for the observation day or
    /// no baseline history; the caller skips it without error.
    pub async fn build(&self, url: &str) -> Result<Option<PageSeries>, FetchError> {
        let observation_rows = self
            .source
            .fetch(self.windows.observation_window(), Some(url))
            .await?;
        let observation_row = match observation_rows.into_iter().next() {
            Some(row) => row,
            None => {
                debug!(
                    url = %url,
                    date = %self.windows.observation,
                    "no rows for observation day, skipping page"
                );
                return Ok(None);
            }
        };

        let baseline_rows = self
            .source
            .fetch(self.windows.baseline_window(), Some(url))
            .await?;
        if baseline_rows.is_empty() {
            debug!(url = %url, "no baseline rows, skipping page");
            return Ok(None);
        }

        let clicks = metric_series(MetricKind::Clicks, &baseline_rows, &observation_row);
        let impressions = metric_series(MetricKind::Impressions, &baseline_rows, &observation_row);

        Ok(Some(PageSeries {
            url: url.to_string(),
            clicks,
            impressions,
            baseline_rows,
            observation_row,
        }))
    }
}

fn metric_series(kind: MetricKind, baseline: &[MetricRow], observation: &MetricRow) -> MetricSeries {
    MetricSeries {
        kind,
        baseline: baseline.iter().map(|row| row.value(kind)).collect(),
        observed: observation.value(kind),
    }
}
