//! Milk production prediction engine
//!
//! A request flows through validation, feature formatting, standard
//! scaling and one of the registered scorers. The pipeline then applies a
//! final session jitter and a floor so that a successful prediction is
//! always a positive volume.

mod accuracy;
mod features;
mod registry;
mod scaler;
mod scorers;

pub use accuracy::{
    calculate_accuracy, AccuracyAnalysis, AccuracyFilter, AccuracyPoint, AccuracySummary,
};
pub use features::{
    CowFeatures, FeatureVector, DEFAULT_WEEKLY_FEED_KG, RECENT_START, REFERENCE_BREED,
};
pub use registry::{catalog, catalog_by_accuracy, ModelKind, ModelSort};
pub use scaler::{StandardScaler, FEATURE_MEANS, FEATURE_STDS, SCALED_SLOTS};
pub use scorers::{
    jitter, BoostedEnsembleScorer, DecisionTreeScorer, LinearScorer, NeuralNetScorer,
    RandomForestScorer, Scorer,
};

use crate::error::PredictionError;
use crate::models::{PredictionOutcome, PredictionRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Half-width of the jitter applied to every scorer output
pub const SESSION_JITTER: f64 = 0.05;

/// Smallest volume a successful prediction reports (liters)
pub const MIN_PREDICTION_LITERS: f64 = 0.5;

/// Stateless prediction pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct MilkPredictor {
    scaler: StandardScaler,
}

impl MilkPredictor {
    pub fn new() -> Self {
        Self {
            scaler: StandardScaler::new(),
        }
    }

    /// Predict the next session's production using the given random source
    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        request: &PredictionRequest,
        rng: &mut R,
    ) -> Result<f64, PredictionError> {
        let model = ModelKind::lookup(&request.model_id)?;
        let features = CowFeatures::from_request(request)?.to_vector();
        let scaled = self.scaler.transform(&features);

        let raw = model.score(scaled.as_slice(), rng);
        let prediction = (raw * jitter(rng, SESSION_JITTER)).max(MIN_PREDICTION_LITERS);

        debug!(
            model_id = %model,
            features = features.len(),
            raw_score = raw,
            prediction = prediction,
            "Scored prediction request"
        );
        Ok(prediction)
    }

    /// Predict with a generator freshly seeded from OS entropy
    pub fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictionError> {
        let mut rng = StdRng::from_entropy();
        self.predict_with_rng(request, &mut rng)
    }

    /// Predict and fold the result into the caller-facing outcome shape.
    /// Accuracy is attached when the actual production is already known.
    pub fn predict_outcome_with_rng<R: Rng + ?Sized>(
        &self,
        request: &PredictionRequest,
        actual: Option<f64>,
        rng: &mut R,
    ) -> PredictionOutcome {
        match self.predict_with_rng(request, rng) {
            Ok(prediction) => PredictionOutcome::success(
                prediction,
                actual.map(|a| calculate_accuracy(prediction, a)),
            ),
            Err(e) => {
                warn!(model_id = %request.model_id, error = %e, "Prediction failed");
                PredictionOutcome::failure(e)
            }
        }
    }

    pub fn predict_outcome(
        &self,
        request: &PredictionRequest,
        actual: Option<f64>,
    ) -> PredictionOutcome {
        let mut rng = StdRng::from_entropy();
        self.predict_outcome_with_rng(request, actual, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    fn scenario(model_id: &str) -> PredictionRequest {
        PredictionRequest {
            cow_id: Some("cow-1".to_string()),
            model_id: model_id.to_string(),
            breed: "Holstein".to_string(),
            weight_kg: Some(550.0),
            age_months: Some(40.0),
            lactation_days: Some(150.0),
            temperature: Some(22.0),
            udder_humidity: Some(65.0),
            feed_amount: Some(15.0),
            weekly_feed_kg: None,
            recent_productions: vec![18.0, 17.5, 17.0, 16.5, 16.0],
        }
    }

    #[test]
    fn test_linear_scenario_within_jitter_band() {
        // Every slot sits on its mean except the breed indicator (0.5):
        // 2.0 + 0.4 * 0.5
        let unjittered = 2.2;
        let predictor = MilkPredictor::new();
        for _ in 0..50 {
            let prediction = predictor.predict(&scenario("model1")).unwrap();
            assert!(prediction.is_finite());
            assert!(prediction >= unjittered * (1.0 - SESSION_JITTER) - 1e-9);
            assert!(prediction <= unjittered * (1.0 + SESSION_JITTER) + 1e-9);
        }
    }

    #[test]
    fn test_deterministic_source_gives_exact_value() {
        let predictor = MilkPredictor::new();
        let prediction = predictor
            .predict_with_rng(&scenario("model1"), &mut StepRng::new(0, 0))
            .unwrap();
        assert!((prediction - 2.2 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_below_linear() {
        let predictor = MilkPredictor::new();
        for _ in 0..50 {
            let linear = predictor.predict(&scenario("model1")).unwrap();
            let ridge = predictor.predict(&scenario("model3")).unwrap();
            assert!(ridge < linear, "ridge {} >= linear {}", ridge, linear);
        }
    }

    #[test]
    fn test_unknown_model_fails_with_zero_liters() {
        let predictor = MilkPredictor::new();
        let err = predictor.predict(&scenario("model99")).unwrap_err();
        assert_eq!(err, PredictionError::ModelNotFound("model99".to_string()));

        let outcome = predictor.predict_outcome(&scenario("model99"), Some(18.0));
        assert_eq!(outcome.prediction, 0.0);
        assert_eq!(outcome.accuracy, None);
        assert_eq!(outcome.error.as_deref(), Some("Model model99 not found"));
    }

    #[test]
    fn test_missing_input_fails_with_zero_liters() {
        let mut request = scenario("model2");
        request.weight_kg = None;
        let outcome = MilkPredictor::new().predict_outcome(&request, None);
        assert_eq!(outcome.prediction, 0.0);
        assert!(outcome.error.unwrap().contains("weight_kg"));
    }

    #[test]
    fn test_floor_applied() {
        // Very hot weather drives the linear score negative; the pipeline
        // still reports the minimum volume.
        let mut request = scenario("model1");
        request.temperature = Some(400.0);
        let prediction = MilkPredictor::new()
            .predict_with_rng(&request, &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(prediction, MIN_PREDICTION_LITERS);
    }

    #[test]
    fn test_outcome_carries_accuracy() {
        let outcome = MilkPredictor::new().predict_outcome_with_rng(
            &scenario("model1"),
            Some(2.09),
            &mut StepRng::new(0, 0),
        );
        assert!(!outcome.is_error());
        assert!((outcome.accuracy.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_history_is_accepted() {
        let mut request = scenario("model4");
        request.recent_productions = vec![17.0; 12];
        assert!(MilkPredictor::new().predict(&request).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        #[test]
        fn prop_every_model_reports_positive_volume(
            model in 1usize..=6,
            weight in 300.0f64..900.0,
            age in 12.0f64..150.0,
            lactation in 0.0f64..400.0,
            temperature in -10.0f64..45.0,
            humidity in 20.0f64..100.0,
            feed in 0.0f64..40.0,
            recent in proptest::collection::vec(0.0f64..45.0, 0..10),
            seed in any::<u64>(),
        ) {
            let request = PredictionRequest {
                cow_id: None,
                model_id: format!("model{}", model),
                breed: "Jersey".to_string(),
                weight_kg: Some(weight),
                age_months: Some(age),
                lactation_days: Some(lactation),
                temperature: Some(temperature),
                udder_humidity: Some(humidity),
                feed_amount: Some(feed),
                weekly_feed_kg: None,
                recent_productions: recent,
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let prediction = MilkPredictor::new().predict_with_rng(&request, &mut rng).unwrap();
            prop_assert!(prediction.is_finite());
            prop_assert!(prediction >= MIN_PREDICTION_LITERS);
        }
    }
}
