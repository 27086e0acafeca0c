//! Observability infrastructure for the predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions per model, errors, herd totals)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter_vec, register_int_gauge, Gauge,
    Histogram, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.000_01, 0.000_05, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    herd_total_liters: Gauge,
    herd_cows_predicted: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "milk_predictor_prediction_latency_seconds",
                "Time spent scoring a single prediction request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "milk_predictor_predictions_total",
                "Successful predictions by model",
                &["model"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "milk_predictor_prediction_errors_total",
                "Rejected prediction requests by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            herd_total_liters: register_gauge!(
                "milk_predictor_herd_total_liters",
                "Total predicted production of the last herd run"
            )
            .expect("Failed to register herd_total_liters"),

            herd_cows_predicted: register_int_gauge!(
                "milk_predictor_herd_cows_predicted",
                "Number of cows scored in the last herd run"
            )
            .expect("Failed to register herd_cows_predicted"),
        }
    }
}

/// Handle to the process-wide prediction metrics.
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, model_id: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[model_id])
            .inc();
    }

    /// Spread a batch's wall time evenly over its predictions
    pub fn observe_batch_latency(&self, duration_secs: f64, count: usize) {
        if count == 0 {
            return;
        }
        let per_prediction = duration_secs / count as f64;
        for _ in 0..count {
            self.inner()
                .prediction_latency_seconds
                .observe(per_prediction);
        }
    }

    pub fn latency_sample_count(&self) -> u64 {
        self.inner().prediction_latency_seconds.get_sample_count()
    }

    /// Count a batch of predictions, one per scored cow
    pub fn inc_predictions_by(&self, model_id: &str, count: usize) {
        self.inner()
            .predictions_total
            .with_label_values(&[model_id])
            .inc_by(count as u64);
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Record the outcome of a herd run
    pub fn set_herd_result(&self, cows: usize, total_liters: f64) {
        self.inner().herd_cows_predicted.set(cows as i64);
        self.inner().herd_total_liters.set(total_liters);
    }

    pub fn predictions_count(&self, model_id: &str) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[model_id])
            .get()
    }
}

/// Structured logger for predictor events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a successful prediction
    pub fn log_prediction(
        &self,
        cow_id: Option<&str>,
        model_id: &str,
        prediction: f64,
        accuracy: Option<f64>,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            cow_id = cow_id.unwrap_or("-"),
            model_id = %model_id,
            prediction_liters = prediction,
            accuracy = ?accuracy,
            "Generated milk production prediction"
        );
    }

    /// Log a rejected prediction
    pub fn log_prediction_failure(&self, model_id: &str, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            model_id = %model_id,
            error_kind = %kind,
            error = %error,
            "Prediction request rejected"
        );
    }

    /// Log a completed herd run
    pub fn log_herd_prediction(&self, model_id: &str, cows: usize, total_liters: f64) {
        info!(
            event = "herd_prediction_generated",
            service = %self.service,
            model_id = %model_id,
            cows = cows,
            total_liters = total_liters,
            "Generated herd prediction"
        );
    }

    pub fn log_startup(&self, version: &str, models: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            models = models,
            "Milk predictor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Milk predictor shutting down"
        );
    }
}
