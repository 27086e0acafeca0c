//! Milk production prediction library
//!
//! This crate provides the core functionality for:
//! - Feature formatting and standard scaling of cow/session attributes
//! - Six fixed-weight scoring models with injectable jitter
//! - Prediction accuracy scoring and summaries
//! - Herd-wide batch prediction
//! - Metrics and structured logging

pub mod error;
pub mod herd;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::PredictionError;
pub use herd::{predict_herd, HerdPrediction, HerdPredictionEntry};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{
    calculate_accuracy, AccuracyAnalysis, AccuracyFilter, AccuracyPoint, AccuracySummary,
    MilkPredictor, ModelKind, ModelSort,
};
