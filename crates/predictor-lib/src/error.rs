//! Error types for the prediction pipeline

use thiserror::Error;

/// Errors produced while turning a request into a milk production estimate.
///
/// Both variants are local to a single prediction call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The requested model identifier is not registered.
    #[error("Model {0} not found")]
    ModelNotFound(String),

    /// A required input was missing or not a finite number.
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

impl PredictionError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: "value is required".to_string(),
        }
    }

    pub fn not_finite(field: impl Into<String>, value: f64) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: format!("{} is not a finite number", value),
        }
    }

    /// Short machine-readable label, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelNotFound(_) => "model_not_found",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }
}
