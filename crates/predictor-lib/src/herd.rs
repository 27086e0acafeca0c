//! Herd-wide prediction
//!
//! Builds one prediction request per milking cow from its profile and
//! latest milking sessions, scores them with a single model and collects
//! the rows the persistence layer stores.

use crate::error::PredictionError;
use crate::models::{CowProfile, MilkingRecord, PredictionRecord, PredictionRequest};
use crate::predictor::{calculate_accuracy, MilkPredictor, ModelKind};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Number of latest sessions used as production history
pub const RECENT_RECORD_LIMIT: usize = 7;

/// Session defaults for cows without any recorded milking. A stored
/// reading, zero included, is always used as is.
pub const DEFAULT_TEMPERATURE: f64 = 22.0;
pub const DEFAULT_UDDER_HUMIDITY: f64 = 70.0;
pub const DEFAULT_FEED_AMOUNT: f64 = 15.0;

/// Per-cow herd prediction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdPredictionEntry {
    pub cow_id: String,
    pub cow_name: String,
    pub prediction: f64,
    pub actual: Option<f64>,
    pub accuracy: Option<f64>,
}

/// Result of predicting the whole herd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdPrediction {
    pub model_id: String,
    pub entries: Vec<HerdPredictionEntry>,
    pub total_prediction: f64,
    pub records: Vec<PredictionRecord>,
}

/// Build a prediction request for one cow from its newest sessions
pub fn request_for_cow(
    cow: &CowProfile,
    records: &[MilkingRecord],
    model: ModelKind,
) -> PredictionRequest {
    let mut history: Vec<&MilkingRecord> =
        records.iter().filter(|r| r.cow_id == cow.id).collect();
    history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    history.truncate(RECENT_RECORD_LIMIT);

    let latest = history.first();
    let recent_productions = if history.is_empty() {
        vec![cow.avg_production]
    } else {
        history.iter().map(|r| r.production_liters).collect()
    };

    PredictionRequest {
        cow_id: Some(cow.id.clone()),
        model_id: model.id().to_string(),
        breed: cow.breed.clone(),
        weight_kg: Some(cow.weight_kg),
        age_months: Some(cow.age_months),
        lactation_days: Some(cow.lactation_days),
        temperature: Some(latest.map_or(DEFAULT_TEMPERATURE, |r| r.temperature)),
        udder_humidity: Some(latest.map_or(DEFAULT_UDDER_HUMIDITY, |r| r.udder_humidity)),
        feed_amount: Some(latest.map_or(DEFAULT_FEED_AMOUNT, |r| r.feed_amount)),
        weekly_feed_kg: latest.and_then(|r| r.weekly_feed_kg),
        recent_productions,
    }
}

/// Predict every active, milking cow of the herd.
///
/// The model id is resolved before any cow is scored. The first failing
/// cow aborts the batch.
pub fn predict_herd_with_rng<R: Rng + ?Sized>(
    predictor: &MilkPredictor,
    model_id: &str,
    cows: &[CowProfile],
    records: &[MilkingRecord],
    actuals: &HashMap<String, f64>,
    prediction_date: NaiveDate,
    rng: &mut R,
) -> Result<HerdPrediction, PredictionError> {
    let model = ModelKind::lookup(model_id)?;
    let mut entries = Vec::new();
    let mut rows = Vec::new();

    for cow in cows.iter().filter(|c| c.is_milking()) {
        let request = request_for_cow(cow, records, model);
        let prediction = predictor.predict_with_rng(&request, rng)?;
        let actual = actuals.get(&cow.id).copied();

        debug!(cow_id = %cow.id, prediction = prediction, "Predicted cow");

        rows.push(PredictionRecord::new(
            cow.id.clone(),
            prediction,
            actual,
            prediction_date,
        ));
        entries.push(HerdPredictionEntry {
            cow_id: cow.id.clone(),
            cow_name: cow.name.clone(),
            prediction,
            actual,
            accuracy: actual.map(|a| calculate_accuracy(prediction, a)),
        });
    }

    let total_prediction: f64 = entries.iter().map(|e| e.prediction).sum();
    info!(
        model_id = %model,
        cows = entries.len(),
        skipped = cows.len() - entries.len(),
        total_prediction = total_prediction,
        "Herd prediction completed"
    );

    Ok(HerdPrediction {
        model_id: model.id().to_string(),
        entries,
        total_prediction,
        records: rows,
    })
}

/// Predict the herd with entropy-seeded jitter, dated today (UTC)
pub fn predict_herd(
    predictor: &MilkPredictor,
    model_id: &str,
    cows: &[CowProfile],
    records: &[MilkingRecord],
    actuals: &HashMap<String, f64>,
) -> Result<HerdPrediction, PredictionError> {
    let mut rng = StdRng::from_entropy();
    predict_herd_with_rng(
        predictor,
        model_id,
        cows,
        records,
        actuals,
        Utc::now().date_naive(),
        &mut rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CowStatus;
    use chrono::{Duration, TimeZone};
    use rand::rngs::mock::StepRng;

    fn cow(id: &str, status: CowStatus, milking: bool) -> CowProfile {
        CowProfile {
            id: id.to_string(),
            name: format!("Cow {}", id),
            breed: "Holstein".to_string(),
            weight_kg: 550.0,
            age_months: 40.0,
            lactation_days: 150.0,
            avg_production: 19.5,
            status,
            milking_status: milking,
        }
    }

    fn session(cow_id: &str, hours_ago: i64, liters: f64) -> MilkingRecord {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        MilkingRecord {
            cow_id: cow_id.to_string(),
            production_liters: liters,
            temperature: 24.0 + hours_ago as f64,
            udder_humidity: 60.0,
            feed_amount: 14.0,
            weekly_feed_kg: None,
            created_at: base - Duration::hours(hours_ago),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_request_uses_newest_sessions_first() {
        let records: Vec<MilkingRecord> = (0..10)
            .rev()
            .map(|h| session("a", h, 10.0 + h as f64))
            .chain(std::iter::once(session("b", 0, 99.0)))
            .collect();
        let request = request_for_cow(
            &cow("a", CowStatus::Active, true),
            &records,
            ModelKind::DecisionTree,
        );

        assert_eq!(request.model_id, "model2");
        assert_eq!(
            request.recent_productions,
            vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]
        );
        assert_eq!(request.temperature, Some(24.0));
        assert_eq!(request.udder_humidity, Some(60.0));
        assert_eq!(request.feed_amount, Some(14.0));
    }

    #[test]
    fn test_request_defaults_without_sessions() {
        let request = request_for_cow(
            &cow("a", CowStatus::Active, true),
            &[],
            ModelKind::LinearRegression,
        );
        assert_eq!(request.recent_productions, vec![19.5]);
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(request.udder_humidity, Some(DEFAULT_UDDER_HUMIDITY));
        assert_eq!(request.feed_amount, Some(DEFAULT_FEED_AMOUNT));
        assert_eq!(request.weekly_feed_kg, None);
    }

    #[test]
    fn test_request_keeps_stored_zero_readings() {
        let mut cold = session("a", 0, 12.0);
        cold.temperature = 0.0;
        cold.udder_humidity = 0.0;
        cold.feed_amount = 0.0;

        let request = request_for_cow(
            &cow("a", CowStatus::Active, true),
            &[cold],
            ModelKind::LinearRegression,
        );
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.udder_humidity, Some(0.0));
        assert_eq!(request.feed_amount, Some(0.0));
    }

    #[test]
    fn test_herd_skips_non_milking_cows() {
        let cows = vec![
            cow("a", CowStatus::Active, true),
            cow("b", CowStatus::Inactive, true),
            cow("c", CowStatus::Treatment, true),
            cow("d", CowStatus::Active, false),
            cow("e", CowStatus::Active, true),
        ];
        let herd = predict_herd_with_rng(
            &MilkPredictor::new(),
            "model1",
            &cows,
            &[],
            &HashMap::new(),
            date(),
            &mut StepRng::new(0, 0),
        )
        .unwrap();

        let ids: Vec<&str> = herd.entries.iter().map(|e| e.cow_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
        assert_eq!(herd.records.len(), 2);
        let sum: f64 = herd.entries.iter().map(|e| e.prediction).sum();
        assert!((herd.total_prediction - sum).abs() < 1e-12);
        assert!(herd.entries.iter().all(|e| e.prediction >= 0.5));
    }

    #[test]
    fn test_herd_attaches_accuracy_for_known_actuals() {
        let cows = vec![cow("a", CowStatus::Active, true), cow("b", CowStatus::Active, true)];
        let actuals = HashMap::from([("a".to_string(), 20.0)]);
        let herd = predict_herd_with_rng(
            &MilkPredictor::new(),
            "model2",
            &cows,
            &[],
            &actuals,
            date(),
            &mut StepRng::new(0, 0),
        )
        .unwrap();

        assert_eq!(herd.entries[0].actual, Some(20.0));
        assert!(herd.entries[0].accuracy.is_some());
        assert_eq!(herd.entries[1].actual, None);
        assert_eq!(herd.entries[1].accuracy, None);

        assert_eq!(herd.records[0].cow_id, "a");
        assert_eq!(herd.records[0].prediction_date, date());
        assert_eq!(herd.records[0].accuracy, herd.entries[0].accuracy);
    }

    #[test]
    fn test_unknown_model_rejects_whole_herd() {
        let cows = vec![cow("a", CowStatus::Active, true)];
        let err = predict_herd(&MilkPredictor::new(), "model42", &cows, &[], &HashMap::new())
            .unwrap_err();
        assert_eq!(err, PredictionError::ModelNotFound("model42".to_string()));
    }

    #[test]
    fn test_empty_herd() {
        let herd =
            predict_herd(&MilkPredictor::new(), "model6", &[], &[], &HashMap::new()).unwrap();
        assert!(herd.entries.is_empty());
        assert_eq!(herd.total_prediction, 0.0);
    }
}
