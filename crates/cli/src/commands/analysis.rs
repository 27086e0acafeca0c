//! Offline accuracy commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use predictor_lib::{
    calculate_accuracy, AccuracyAnalysis, AccuracyFilter, AccuracyPoint, PredictionRecord,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_accuracy, format_accuracy, format_liters, print_json, print_rows, print_warning,
    OutputFormat,
};

#[derive(Serialize)]
struct AccuracyReport {
    predicted: f64,
    actual: f64,
    accuracy: f64,
}

/// Row for the summary table
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Predictions")]
    total: usize,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Best")]
    best: String,
    #[tabled(rename = "Worst")]
    worst: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
}

/// Row for the per-prediction table
#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Cow")]
    cow_id: String,
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Difference")]
    difference: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
}

impl From<&AccuracyPoint> for PointRow {
    fn from(point: &AccuracyPoint) -> Self {
        Self {
            cow_id: point.cow_id.clone(),
            date: point.date,
            predicted: format_liters(point.predicted),
            actual: format_liters(point.actual),
            difference: format!("{:+.2} L", point.difference),
            accuracy: color_accuracy(Some(point.accuracy)),
        }
    }
}

/// Parse a liters argument, rejecting NaN and infinities
pub fn parse_liters(value: &str) -> std::result::Result<f64, String> {
    let liters: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if liters.is_finite() {
        Ok(liters)
    } else {
        Err(format!("'{}' is not a finite volume", value))
    }
}

/// Score one prediction against its actual volume
pub fn show_accuracy(predicted: f64, actual: f64, format: OutputFormat) -> Result<()> {
    let accuracy = calculate_accuracy(predicted, actual);

    match format {
        OutputFormat::Json => print_json(&AccuracyReport {
            predicted,
            actual,
            accuracy,
        })?,
        OutputFormat::Table => println!("Accuracy: {}", color_accuracy(Some(accuracy))),
    }

    Ok(())
}

/// Date span of the scored points
fn scored_date_range(points: &[AccuracyPoint]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = points.iter().map(|p| p.date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

pub fn read_records(path: &Path) -> Result<Vec<PredictionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read predictions file {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse predictions file")
}

/// Summarize stored prediction rows, optionally for one cow and a
/// trailing window of days
pub fn show_summary(file: &Path, filter: &AccuracyFilter, format: OutputFormat) -> Result<()> {
    let records = read_records(file)?;
    let analysis = AccuracyAnalysis::as_of_today(&records, filter);
    let summary = &analysis.summary;

    match format {
        OutputFormat::Json => print_json(&analysis)?,
        OutputFormat::Table => {
            if summary.total_predictions == 0 {
                print_warning("No predictions with a known actual volume");
                return Ok(());
            }

            let (from, to) = scored_date_range(&analysis.points)
                .map(|(lo, hi)| (lo.to_string(), hi.to_string()))
                .unwrap_or_default();
            print_rows(vec![SummaryRow {
                total: summary.total_predictions,
                average: format_accuracy(Some(summary.average_accuracy)),
                best: format_accuracy(Some(summary.best_accuracy)),
                worst: format_accuracy(Some(summary.worst_accuracy)),
                from,
                to,
            }]);
            println!();
            print_rows(analysis.points.iter().map(PointRow::from).collect());
        }
    }

    Ok(())
}
