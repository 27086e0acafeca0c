//! Feature formatting for the scoring models
//!
//! Builds the positional feature vector shared by the scaler and every
//! scorer. There is no schema attached to the vector; slot indices below
//! are the only contract.

use crate::error::PredictionError;
use crate::models::PredictionRequest;
use serde::{Deserialize, Serialize};

pub const WEIGHT: usize = 0;
pub const AGE: usize = 1;
pub const LACTATION_DAYS: usize = 2;
pub const TEMPERATURE: usize = 3;
pub const UDDER_HUMIDITY: usize = 4;
pub const FEED: usize = 5;
pub const WEEKLY_FEED: usize = 6;
pub const HOLSTEIN: usize = 7;
/// First recent-production slot; readings run to the end of the vector
pub const RECENT_START: usize = 8;

/// The only breed with a non-zero indicator (exact, case-sensitive match)
pub const REFERENCE_BREED: &str = "Holstein";

/// Weekly feed used when the caller does not supply one. Equal to the
/// scaler mean, so it standardizes to zero.
pub const DEFAULT_WEEKLY_FEED_KG: f64 = 100.0;

/// Ordered numeric encoding of a cow and its milking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Recent production readings (slot 8 onward)
    pub fn recent_productions(&self) -> &[f64] {
        self.0.get(RECENT_START..).unwrap_or(&[])
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Validated cow and session attributes
#[derive(Debug, Clone, PartialEq)]
pub struct CowFeatures {
    pub weight_kg: f64,
    pub age_months: f64,
    pub lactation_days: f64,
    pub temperature: f64,
    pub udder_humidity: f64,
    pub feed_amount: f64,
    pub weekly_feed_kg: f64,
    pub breed: String,
    pub recent_productions: Vec<f64>,
}

impl CowFeatures {
    /// Validate a raw request. Fails on the first missing or non-finite
    /// required value; nothing is computed for a rejected request.
    pub fn from_request(request: &PredictionRequest) -> Result<Self, PredictionError> {
        let weekly_feed_kg = match request.weekly_feed_kg {
            Some(value) => finite("weekly_feed_kg", value)?,
            None => DEFAULT_WEEKLY_FEED_KG,
        };

        for (idx, value) in request.recent_productions.iter().enumerate() {
            finite(&format!("recent_productions[{}]", idx), *value)?;
        }

        Ok(Self {
            weight_kg: required("weight_kg", request.weight_kg)?,
            age_months: required("age_months", request.age_months)?,
            lactation_days: required("lactation_days", request.lactation_days)?,
            temperature: required("temperature", request.temperature)?,
            udder_humidity: required("udder_humidity", request.udder_humidity)?,
            feed_amount: required("feed_amount", request.feed_amount)?,
            weekly_feed_kg,
            breed: request.breed.clone(),
            recent_productions: request.recent_productions.clone(),
        })
    }

    pub fn is_reference_breed(&self) -> bool {
        self.breed == REFERENCE_BREED
    }

    /// Assemble the feature vector in slot order
    pub fn to_vector(&self) -> FeatureVector {
        let mut values = Vec::with_capacity(RECENT_START + self.recent_productions.len());
        values.extend_from_slice(&[
            self.weight_kg,
            self.age_months,
            self.lactation_days,
            self.temperature,
            self.udder_humidity,
            self.feed_amount,
            self.weekly_feed_kg,
            if self.is_reference_breed() { 1.0 } else { 0.0 },
        ]);
        values.extend_from_slice(&self.recent_productions);
        FeatureVector(values)
    }
}

fn required(field: &str, value: Option<f64>) -> Result<f64, PredictionError> {
    match value {
        Some(v) => finite(field, v),
        None => Err(PredictionError::missing(field)),
    }
}

fn finite(field: &str, value: f64) -> Result<f64, PredictionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictionError::not_finite(field, value))
    }
}
