//! Report rendering for the terminal

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use monitor_lib::{AnomalyReport, ChartSeries, ClassificationRecord, Tier};
use tabled::{settings::Style, Table, Tabled};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Rendered tables (default)
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

/// Row for the deviation summary tables
#[derive(Tabled)]
struct DeviationRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "StDev")]
    std_dev: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Actual")]
    observed: String,
}

/// Row for per-page chart tables
#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Clicks")]
    clicks: u64,
    #[tabled(rename = "Impressions")]
    impressions: u64,
}

/// Print the full report in the requested format
pub fn print_report(report: &AnomalyReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            if report.is_empty() {
                print_success("No deviations detected");
                return Ok(());
            }

            if !report.flagged().is_empty() {
                println!("{}", "Flagged (tier 3)".red().bold());
                print_records(report.flagged());
            }

            if !report.moderate().is_empty() {
                println!("{}", "Moderate (tiers 1-2)".yellow().bold());
                print_records(report.moderate());
            }

            for series in report.charts() {
                print_chart(series);
            }

            println!(
                "\nTotal: {} deviations ({} flagged)",
                report.len(),
                report.flagged().len()
            );
        }
    }

    Ok(())
}

fn print_records(records: &[ClassificationRecord]) {
    let rows: Vec<DeviationRow> = records
        .iter()
        .map(|record| DeviationRow {
            metric: record.metric.to_string(),
            direction: record.direction.to_string(),
            url: record.url.clone(),
            mean: format!("{:.2}", record.mean),
            std_dev: format!("{:.2}", record.std_dev),
            tier: color_tier(record.tier),
            observed: format!("{:.0}", record.observed),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn print_chart(series: &ChartSeries) {
    println!("\n{} {}", "Daily series for".bold(), series.url);

    let rows: Vec<ChartRow> = series
        .points
        .iter()
        .map(|point| ChartRow {
            date: point.date.to_string(),
            clicks: point.clicks,
            impressions: point.impressions,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Tier label colored by severity
fn color_tier(tier: Tier) -> String {
    let label = tier.level().to_string();
    match tier {
        Tier::Three => label.red().bold().to_string(),
        Tier::Two => label.yellow().to_string(),
        Tier::One => label,
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}
