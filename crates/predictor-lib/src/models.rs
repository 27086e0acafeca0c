//! Core data models for the milk production predictor

use crate::predictor::calculate_accuracy;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw prediction request as received from a caller.
///
/// Numeric attributes are optional here so that a missing field can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cow_id: Option<String>,
    #[serde(default, alias = "modelId")]
    pub model_id: String,
    #[serde(default)]
    pub breed: String,
    pub weight_kg: Option<f64>,
    pub age_months: Option<f64>,
    pub lactation_days: Option<f64>,
    pub temperature: Option<f64>,
    pub udder_humidity: Option<f64>,
    pub feed_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_feed_kg: Option<f64>,
    /// Most recent reading first
    #[serde(default, alias = "recentProductions")]
    pub recent_productions: Vec<f64>,
}

/// Herd membership state of a cow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CowStatus {
    Active,
    Inactive,
    Treatment,
}

/// A cow as stored by the farm records collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CowProfile {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub weight_kg: f64,
    pub age_months: f64,
    pub lactation_days: f64,
    #[serde(default)]
    pub avg_production: f64,
    pub status: CowStatus,
    pub milking_status: bool,
}

impl CowProfile {
    /// Only active cows currently being milked get a prediction
    pub fn is_milking(&self) -> bool {
        self.status == CowStatus::Active && self.milking_status
    }
}

/// A single milking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilkingRecord {
    pub cow_id: String,
    pub production_liters: f64,
    pub temperature: f64,
    pub udder_humidity: f64,
    pub feed_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_feed_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Result of a single prediction as handed back to the caller.
///
/// On failure `prediction` is 0 and `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub prediction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionOutcome {
    pub fn success(prediction: f64, accuracy: Option<f64>) -> Self {
        Self {
            prediction,
            accuracy,
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            prediction: 0.0,
            accuracy: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Prediction row handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub cow_id: String,
    pub predicted_production: f64,
    #[serde(default)]
    pub actual_production: Option<f64>,
    pub prediction_date: NaiveDate,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl PredictionRecord {
    /// Build a row, scoring accuracy when the actual volume is known
    pub fn new(
        cow_id: impl Into<String>,
        predicted_production: f64,
        actual_production: Option<f64>,
        prediction_date: NaiveDate,
    ) -> Self {
        Self {
            cow_id: cow_id.into(),
            predicted_production,
            actual_production,
            prediction_date,
            accuracy: actual_production.map(|a| calculate_accuracy(predicted_production, a)),
        }
    }
}

/// Typical accuracy band, in percent, expected on unseen herds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRange {
    pub low: f64,
    pub high: f64,
}

impl std::fmt::Display for AccuracyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}%", self.low, self.high)
    }
}

/// Catalog entry describing a registered scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Accuracy reported on the training benchmark, in percent
    pub reported_accuracy: f64,
    pub expected_accuracy: AccuracyRange,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_camel_case_aliases() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"modelId":"model2","breed":"Jersey","weight_kg":480,
                "recentProductions":[12.5,13.0]}"#,
        )
        .unwrap();
        assert_eq!(request.model_id, "model2");
        assert_eq!(request.weight_kg, Some(480.0));
        assert_eq!(request.age_months, None);
        assert_eq!(request.recent_productions, vec![12.5, 13.0]);
    }

    #[test]
    fn test_cow_status_serialization() {
        let json = serde_json::to_string(&CowStatus::Treatment).unwrap();
        assert_eq!(json, "\"treatment\"");
    }

    #[test]
    fn test_outcome_failure_shape() {
        let outcome = PredictionOutcome::failure("Model model99 not found");
        assert!(outcome.is_error());
        assert_eq!(outcome.prediction, 0.0);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["prediction"], 0.0);
        assert_eq!(json["error"], "Model model99 not found");
        assert!(json.get("accuracy").is_none());
    }

    #[test]
    fn test_record_accuracy_only_with_actual() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let pending = PredictionRecord::new("c1", 18.0, None, date);
        assert_eq!(pending.accuracy, None);

        let scored = PredictionRecord::new("c1", 18.0, Some(20.0), date);
        assert!((scored.accuracy.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_milking_requires_active_status() {
        let mut cow = CowProfile {
            id: "c1".to_string(),
            name: "Bessie".to_string(),
            breed: "Holstein".to_string(),
            weight_kg: 550.0,
            age_months: 40.0,
            lactation_days: 150.0,
            avg_production: 18.0,
            status: CowStatus::Active,
            milking_status: true,
        };
        assert!(cow.is_milking());

        cow.status = CowStatus::Treatment;
        assert!(!cow.is_milking());

        cow.status = CowStatus::Active;
        cow.milking_status = false;
        assert!(!cow.is_milking());
    }
}
