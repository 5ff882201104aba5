//! One monitoring run over every page in the catalog
//!
//! The run is sequential by design: each page needs both of its queries
//! complete before classification, and the workload is an offline batch
//! job. The only shared state is the report, appended to one page at a
//! time.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::anomaly::{
    AnomalyReport, Assessment, BaselineStats, ClassificationRecord, Tier, TieredClassifier,
};
use crate::error::FetchError;
use crate::filter::UrlFilter;
use crate::models::{DateWindows, MetricKind, MetricRow};
use crate::query::MetricSource;
use crate::series::{PageSeries, SeriesBuilder};

/// Cooperative cancellation flag, checked between pages
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop after the page in flight
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sequential anomaly-detection pipeline for one property
pub struct MonitorPipeline<S> {
    source: S,
    filter: UrlFilter,
    classifier: TieredClassifier,
    windows: DateWindows,
}

impl<S: MetricSource> MonitorPipeline<S> {
    pub fn new(
        source: S,
        filter: UrlFilter,
        classifier: TieredClassifier,
        windows: DateWindows,
    ) -> Self {
        Self {
            source,
            filter,
            classifier,
            windows,
        }
    }

    /// Run the pipeline over every page discovered for the observation day
    ///
    /// Catalog failure aborts the run. A per-page fetch failure skips
    /// that page and continues with the next, so a page yields either
    /// its complete classifications or none at all.
    pub async fn run(&self, cancel: &CancelFlag) -> Result<AnomalyReport, FetchError> {
        let mut report = AnomalyReport::new();

        let catalog = self
            .source
            .fetch(self.windows.observation_window(), None)
            .await?;
        if catalog.is_empty() {
            info!(
                date = %self.windows.observation,
                "empty catalog response, nothing to inspect"
            );
            return Ok(report);
        }

        let pages = distinct_pages(&catalog);
        info!(
            pages = pages.len(),
            date = %self.windows.observation,
            "catalog query complete"
        );

        let builder = SeriesBuilder::new(&self.source, self.windows);

        for url in &pages {
            if cancel.is_cancelled() {
                info!("cancellation requested, stopping before next page");
                break;
            }

            if self.filter.is_excluded(url) {
                debug!(url = %url, "excluded page, skipping");
                continue;
            }

            let series = match builder.build(url).await {
                Ok(Some(series)) => series,
                // No-signal skips are logged by the builder.
                Ok(None) => continue,
                Err(err) => {
                    error!(url = %url, error = %err, "fetch failed after retry, skipping page");
                    continue;
                }
            };

            self.classify_page(&series, &mut report);
        }

        Ok(report)
    }

    fn classify_page(&self, series: &PageSeries, report: &mut AnomalyReport) {
        for kind in MetricKind::ALL {
            let metric = series.metric(kind);
            let stats = BaselineStats::from_values(&metric.baseline);

            match self.classifier.classify(&stats, metric.observed) {
                Assessment::InsufficientSignal => {
                    debug!(
                        url = %series.url(),
                        metric = %kind,
                        observed = metric.observed,
                        "insufficient signal, not classified"
                    );
                }
                Assessment::WithinRange => {}
                Assessment::Deviating(deviation) => {
                    info!(
                        url = %series.url(),
                        metric = %kind,
                        tier = deviation.tier.level(),
                        direction = %deviation.direction,
                        mean = stats.mean,
                        std_dev = stats.std_dev,
                        observed = metric.observed,
                        "deviation detected"
                    );

                    if deviation.tier == Tier::Three {
                        report.attach_chart(series.url(), series.chart_points());
                    }

                    report.record(ClassificationRecord {
                        url: series.url().to_string(),
                        metric: kind,
                        mean: stats.mean,
                        std_dev: stats.std_dev,
                        observed: metric.observed,
                        tier: deviation.tier,
                        direction: deviation.direction,
                    });
                }
            }
        }
    }
}

/// Distinct page URLs in first-seen order
fn distinct_pages(rows: &[MetricRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.url.as_str()))
        .map(|row| row.url.clone())
        .collect()
}
