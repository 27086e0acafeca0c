//! Standard scaling with fixed per-slot constants
//!
//! The table covers the seven scalar attributes, the breed indicator and
//! five recent-production slots. Slots past the table pass through
//! unchanged (mean 0, std 1), which lets longer production histories
//! through without scaling them.

use super::features::FeatureVector;

/// Number of slots with scaling constants
pub const SCALED_SLOTS: usize = 13;

pub const FEATURE_MEANS: [f64; SCALED_SLOTS] = [
    550.0, // weight (kg)
    40.0,  // age (months)
    150.0, // days in lactation
    22.0,  // temperature (°C)
    65.0,  // udder humidity (%)
    15.0,  // feed (kg)
    100.0, // weekly feed (kg)
    0.8,   // Holstein indicator
    18.0, 17.5, 17.0, 16.5, 16.0, // recent productions
];

pub const FEATURE_STDS: [f64; SCALED_SLOTS] = [
    80.0, 15.0, 60.0, 3.0, 10.0, 3.0, 20.0, 0.4, 4.0, 4.0, 4.0, 4.0, 4.0,
];

/// Pre-fitted standard scaler
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }

    /// Mean and standard deviation for a slot
    pub fn params(&self, idx: usize) -> (f64, f64) {
        if idx < SCALED_SLOTS {
            (FEATURE_MEANS[idx], FEATURE_STDS[idx])
        } else {
            (0.0, 1.0)
        }
    }

    /// `(x - mean) / std` per slot
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        features
            .as_slice()
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let (mean, std) = self.params(idx);
                (value - mean) / std
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// `x * std + mean` per slot
    pub fn inverse_transform(&self, features: &FeatureVector) -> FeatureVector {
        features
            .as_slice()
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let (mean, std) = self.params(idx);
                value * std + mean
            })
            .collect::<Vec<_>>()
            .into()
    }
}
