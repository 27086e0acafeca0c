//! HTTP API for predictions, accuracy and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    calculate_accuracy, herd, predictor::catalog, AccuracyAnalysis, AccuracyFilter, CowProfile,
    MilkPredictor, MilkingRecord, ModelInfo, ModelSort, PredictionError, PredictionOutcome,
    PredictionRecord, PredictionRequest, PredictorMetrics, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: MilkPredictor,
    pub metrics: PredictorMetrics,
    pub logger: StructuredLogger,
    pub default_model: String,
}

impl AppState {
    pub fn new(
        metrics: PredictorMetrics,
        logger: StructuredLogger,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            predictor: MilkPredictor::new(),
            metrics,
            logger,
            default_model: default_model.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelQuery {
    #[serde(default)]
    pub sort: ModelSort,
}

/// Single prediction body: the core request plus an optional known actual
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictBody {
    #[serde(flatten)]
    pub request: PredictionRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_production: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HerdBody {
    #[serde(default)]
    pub model_id: Option<String>,
    pub cows: Vec<CowProfile>,
    #[serde(default)]
    pub records: Vec<MilkingRecord>,
    /// Known actual production keyed by cow id
    #[serde(default)]
    pub actuals: HashMap<String, f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccuracyBody {
    pub predicted: f64,
    pub actual: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccuracyResponse {
    pub accuracy: f64,
}

/// Stored predictions to analyze, optionally narrowed by cow and window
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryBody {
    pub records: Vec<PredictionRecord>,
    #[serde(flatten)]
    pub filter: AccuracyFilter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status_for(error: &PredictionError) -> StatusCode {
    match error {
        PredictionError::ModelNotFound(_) => StatusCode::NOT_FOUND,
        PredictionError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn rejection_response<T: Serialize>(state: &AppState, body: T) -> Response {
    state.metrics.inc_prediction_errors("invalid_input");
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        models: catalog().len(),
    })
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn list_models(Query(query): Query<ModelQuery>) -> Json<ModelList> {
    let models = query.sort.catalog();
    let total = models.len();
    Json(ModelList { models, total })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return rejection_response(&state, PredictionOutcome::failure(rejection.body_text()))
        }
    };

    let start = Instant::now();
    let request = &body.request;

    match state.predictor.predict(request) {
        Ok(prediction) => {
            state
                .metrics
                .observe_prediction_latency(start.elapsed().as_secs_f64());
            state.metrics.inc_predictions(&request.model_id);

            let accuracy = body
                .actual_production
                .map(|actual| calculate_accuracy(prediction, actual));
            state.logger.log_prediction(
                request.cow_id.as_deref(),
                &request.model_id,
                prediction,
                accuracy,
            );
            (
                StatusCode::OK,
                Json(PredictionOutcome::success(prediction, accuracy)),
            )
                .into_response()
        }
        Err(e) => {
            state.metrics.inc_prediction_errors(e.kind());
            state
                .logger
                .log_prediction_failure(&request.model_id, e.kind(), &e.to_string());
            (status_for(&e), Json(PredictionOutcome::failure(&e))).into_response()
        }
    }
}

async fn predict_herd(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HerdBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return rejection_response(
                &state,
                ErrorResponse {
                    error: rejection.body_text(),
                },
            )
        }
    };

    let model_id = body
        .model_id
        .unwrap_or_else(|| state.default_model.clone());

    let start = Instant::now();
    match herd::predict_herd(
        &state.predictor,
        &model_id,
        &body.cows,
        &body.records,
        &body.actuals,
    ) {
        Ok(result) => {
            let scored = result.entries.len();
            state
                .metrics
                .observe_batch_latency(start.elapsed().as_secs_f64(), scored);
            state.metrics.inc_predictions_by(&result.model_id, scored);
            state
                .metrics
                .set_herd_result(scored, result.total_prediction);
            state.logger.log_herd_prediction(
                &result.model_id,
                result.entries.len(),
                result.total_prediction,
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            state.metrics.inc_prediction_errors(e.kind());
            state
                .logger
                .log_prediction_failure(&model_id, e.kind(), &e.to_string());
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn accuracy(Json(body): Json<AccuracyBody>) -> Json<AccuracyResponse> {
    Json(AccuracyResponse {
        accuracy: calculate_accuracy(body.predicted, body.actual),
    })
}

async fn accuracy_summary(Json(body): Json<SummaryBody>) -> Json<AccuracyAnalysis> {
    Json(AccuracyAnalysis::as_of_today(&body.records, &body.filter))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/v1/models", get(list_models))
        .route("/api/v1/predictions", post(predict))
        .route("/api/v1/predictions/herd", post(predict_herd))
        .route("/api/v1/accuracy", post(accuracy))
        .route("/api/v1/accuracy/summary", post(accuracy_summary))
        .with_state(state)
}

/// Start the API server and run until the shutdown future resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
