//! Prediction accuracy scoring

use crate::models::PredictionRecord;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Percentage agreement between a prediction and the observed value,
/// clamped to `[0, 100]`. An actual of zero, or any non-finite input,
/// scores 0.
pub fn calculate_accuracy(predicted: f64, actual: f64) -> f64 {
    if actual == 0.0 || !predicted.is_finite() || !actual.is_finite() {
        return 0.0;
    }
    let accuracy = 100.0 - ((predicted - actual) / actual * 100.0).abs();
    accuracy.clamp(0.0, 100.0)
}

/// Aggregate accuracy over a set of stored predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub total_predictions: usize,
    pub average_accuracy: f64,
    pub best_accuracy: f64,
    pub worst_accuracy: f64,
}

impl AccuracySummary {
    /// Summarize records that have a known actual value. Accuracy is
    /// recomputed from the stored predicted/actual pair.
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let scores: Vec<f64> = records
            .iter()
            .filter_map(|r| {
                r.actual_production
                    .map(|actual| calculate_accuracy(r.predicted_production, actual))
            })
            .collect();

        if scores.is_empty() {
            return Self::default();
        }

        Self {
            total_predictions: scores.len(),
            average_accuracy: scores.iter().sum::<f64>() / scores.len() as f64,
            best_accuracy: scores.iter().copied().fold(f64::MIN, f64::max),
            worst_accuracy: scores.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

/// Narrows stored predictions to one cow and/or a trailing window of days
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cow_id: Option<String>,
    /// Keep predictions dated within this many days before `today`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl AccuracyFilter {
    pub fn matches(&self, record: &PredictionRecord, today: NaiveDate) -> bool {
        if let Some(cow_id) = &self.cow_id {
            if &record.cow_id != cow_id {
                return false;
            }
        }
        match self.days {
            Some(days) => {
                let start = today
                    .checked_sub_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MIN);
                record.prediction_date >= start && record.prediction_date <= today
            }
            None => true,
        }
    }
}

/// One scored prediction, ready for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub cow_id: String,
    pub date: NaiveDate,
    pub predicted: f64,
    pub actual: f64,
    /// Predicted minus actual liters
    pub difference: f64,
    pub accuracy: f64,
}

/// Summary plus per-record detail over the filtered predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyAnalysis {
    #[serde(flatten)]
    pub summary: AccuracySummary,
    pub points: Vec<AccuracyPoint>,
}

impl AccuracyAnalysis {
    /// Filter relative to `today`, then score every record with a known
    /// actual. Points are ordered by date.
    pub fn build(records: &[PredictionRecord], filter: &AccuracyFilter, today: NaiveDate) -> Self {
        let selected: Vec<PredictionRecord> = records
            .iter()
            .filter(|r| filter.matches(r, today))
            .cloned()
            .collect();

        let mut points: Vec<AccuracyPoint> = selected
            .iter()
            .filter_map(|r| {
                r.actual_production.map(|actual| AccuracyPoint {
                    cow_id: r.cow_id.clone(),
                    date: r.prediction_date,
                    predicted: r.predicted_production,
                    actual,
                    difference: r.predicted_production - actual,
                    accuracy: calculate_accuracy(r.predicted_production, actual),
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);

        Self {
            summary: AccuracySummary::from_records(&selected),
            points,
        }
    }

    /// Same as [`AccuracyAnalysis::build`] with today's UTC date
    pub fn as_of_today(records: &[PredictionRecord], filter: &AccuracyFilter) -> Self {
        Self::build(records, filter, Utc::now().date_naive())
    }
}
