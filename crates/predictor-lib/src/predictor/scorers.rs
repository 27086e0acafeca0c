//! Scoring functions for the registered models
//!
//! Each scorer maps a standardized feature vector to a liters estimate.
//! The weights are fixed constants; the only non-determinism is the
//! multiplicative jitter drawn from the caller's random source.

use super::features::{
    AGE, FEED, HOLSTEIN, LACTATION_DAYS, RECENT_START, TEMPERATURE, UDDER_HUMIDITY, WEEKLY_FEED,
    WEIGHT,
};
use rand::Rng;

/// Jitter half-width for the decision tree
pub const TREE_JITTER: f64 = 0.10;

/// Jitter half-width for the neural net and the boosted ensemble
pub const FINE_JITTER: f64 = 0.05;

/// Per-feature perturbation half-width for each forest tree
pub const FOREST_FEATURE_JITTER: f64 = 0.10;

/// Number of trees averaged by the forest
pub const FOREST_TREES: usize = 5;

/// Ensemble weights for linear, tree and ridge outputs
pub const ENSEMBLE_WEIGHTS: [f64; 3] = [0.3, 0.5, 0.2];

const LINEAR_WEIGHTS: [f64; 12] = [
    0.2, 0.1, 0.05, -0.1, 0.15, 0.3, 0.1, 0.4, 0.35, 0.3, 0.25, 0.2,
];

const RIDGE_WEIGHTS: [f64; 12] = [
    0.18, 0.09, 0.04, -0.08, 0.14, 0.25, 0.09, 0.36, 0.32, 0.28, 0.24, 0.2,
];

/// A model that turns standardized features into liters
pub trait Scorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64;
}

/// Multiplicative factor drawn uniformly from `[1 - spread, 1 + spread)`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    1.0 - spread + rng.gen::<f64>() * 2.0 * spread
}

fn slot(features: &[f64], idx: usize) -> f64 {
    features.get(idx).copied().unwrap_or(0.0)
}

/// Bias plus a positional weighted sum. Slots beyond the weight table are
/// ignored.
#[derive(Debug, Clone, Copy)]
pub struct LinearScorer {
    weights: &'static [f64],
    bias: f64,
}

impl LinearScorer {
    pub const LINEAR: Self = Self {
        weights: &LINEAR_WEIGHTS,
        bias: 2.0,
    };

    /// Same shape with a shrunken weight table
    pub const RIDGE: Self = Self {
        weights: &RIDGE_WEIGHTS,
        bias: 1.8,
    };

    pub fn raw(&self, features: &[f64]) -> f64 {
        self.bias
            + features
                .iter()
                .zip(self.weights)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }
}

impl Scorer for LinearScorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], _rng: &mut R) -> f64 {
        self.raw(features).max(0.0)
    }
}

/// Four fixed rules on peak recent production, weight and age
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionTreeScorer;

impl DecisionTreeScorer {
    pub fn raw(&self, features: &[f64]) -> f64 {
        let weight = slot(features, WEIGHT);
        let age = slot(features, AGE);
        let feed = slot(features, FEED);
        // No readings leaves the peak at -inf, so the first rule never fires
        let peak = features
            .get(RECENT_START..)
            .unwrap_or(&[])
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if peak > 20.0 {
            peak * 0.95 + weight * 0.01
        } else if weight > 600.0 {
            15.0 + weight * 0.02 + feed * 0.3
        } else if age > 48.0 {
            12.0 + weight * 0.01 + feed * 0.2
        } else {
            8.0 + weight * 0.015 + feed * 0.25
        }
    }
}

impl Scorer for DecisionTreeScorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64 {
        (self.raw(features) * jitter(rng, TREE_JITTER)).max(0.0)
    }
}

/// Weighted sum of every input pushed through a sigmoid-shaped gain
/// centered at 10 liters
#[derive(Debug, Clone, Copy, Default)]
pub struct NeuralNetScorer;

impl NeuralNetScorer {
    /// Pre-activation weighted sum
    pub fn hidden(&self, features: &[f64]) -> f64 {
        let weight = slot(features, WEIGHT);
        let holstein = slot(features, HOLSTEIN);

        1.0 + 0.2 * weight
            + 0.05 * slot(features, AGE)
            - 0.001 * slot(features, LACTATION_DAYS)
            - 0.2 * slot(features, TEMPERATURE)
            + 0.1 * slot(features, UDDER_HUMIDITY)
            + 0.3 * slot(features, FEED)
            + 0.2 * slot(features, WEEKLY_FEED)
            + 0.5 * holstein * weight / 500.0
            + 0.6 * recent_average(features.get(RECENT_START..).unwrap_or(&[]))
    }

    pub fn raw(&self, features: &[f64]) -> f64 {
        let hidden = self.hidden(features);
        hidden * (sigmoid(0.1 * (hidden - 10.0)) * 1.5 + 0.5)
    }
}

impl Scorer for NeuralNetScorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64 {
        (self.raw(features) * jitter(rng, FINE_JITTER)).max(0.0)
    }
}

/// Average of several decision trees, each fed an independently
/// perturbed copy of the input
#[derive(Debug, Clone, Copy)]
pub struct RandomForestScorer {
    trees: usize,
}

impl Default for RandomForestScorer {
    fn default() -> Self {
        Self {
            trees: FOREST_TREES,
        }
    }
}

impl RandomForestScorer {
    /// Forest of `trees` trees. Zero trees always scores 0.
    pub fn with_trees(trees: usize) -> Self {
        Self { trees }
    }

    pub fn trees(&self) -> usize {
        self.trees
    }
}

impl Scorer for RandomForestScorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64 {
        if self.trees == 0 {
            return 0.0;
        }
        let tree = DecisionTreeScorer;
        let total: f64 = (0..self.trees)
            .map(|_| {
                let perturbed: Vec<f64> = features
                    .iter()
                    .map(|value| value * jitter(rng, FOREST_FEATURE_JITTER))
                    .collect();
                tree.score(&perturbed, rng)
            })
            .sum();
        (total / self.trees as f64).max(0.0)
    }
}

/// Fixed-weight blend of the linear, tree and ridge scorers
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostedEnsembleScorer;

impl Scorer for BoostedEnsembleScorer {
    fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64 {
        let outputs = [
            LinearScorer::LINEAR.score(features, rng),
            DecisionTreeScorer.score(features, rng),
            LinearScorer::RIDGE.score(features, rng),
        ];
        let blended: f64 = outputs
            .iter()
            .zip(ENSEMBLE_WEIGHTS)
            .map(|(output, weight)| output * weight)
            .sum();
        (blended * jitter(rng, FINE_JITTER)).max(0.0)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Recency-weighted mean: reading `k` gets weight `1 - 0.1k`. Histories
/// whose weights cancel out average to zero.
fn recent_average(readings: &[f64]) -> f64 {
    let (sum, norm) = readings
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, norm), (idx, value)| {
            let w = 1.0 - idx as f64 * 0.1;
            (sum + value * w, norm + w)
        });
    if norm.abs() < 1e-9 {
        0.0
    } else {
        sum / norm
    }
}
