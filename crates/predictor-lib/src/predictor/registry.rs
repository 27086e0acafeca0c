//! Model registry: identifier lookup and scorer dispatch

use super::scorers::{
    BoostedEnsembleScorer, DecisionTreeScorer, LinearScorer, NeuralNetScorer,
    RandomForestScorer, Scorer,
};
use crate::error::PredictionError;
use crate::models::{AccuracyRange, ModelInfo};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered scoring models, addressed by their `model1`..`model6` ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelKind {
    LinearRegression,
    DecisionTree,
    RidgeRegression,
    NeuralNetwork,
    RandomForest,
    AdaBoost,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LinearRegression,
        ModelKind::DecisionTree,
        ModelKind::RidgeRegression,
        ModelKind::NeuralNetwork,
        ModelKind::RandomForest,
        ModelKind::AdaBoost,
    ];

    /// Resolve an identifier. Unknown ids are an error, never a default.
    pub fn lookup(id: &str) -> Result<Self, PredictionError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| PredictionError::ModelNotFound(id.to_string()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "model1",
            ModelKind::DecisionTree => "model2",
            ModelKind::RidgeRegression => "model3",
            ModelKind::NeuralNetwork => "model4",
            ModelKind::RandomForest => "model5",
            ModelKind::AdaBoost => "model6",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RidgeRegression => "Ridge Regression",
            ModelKind::NeuralNetwork => "LSTM Neural Network",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::AdaBoost => "AdaBoost",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Baseline linear regression over cow and session attributes",
            ModelKind::DecisionTree => "Rule-based tree splitting on recent production, weight and age",
            ModelKind::RidgeRegression => "Regularized linear model with shrunken weights",
            ModelKind::NeuralNetwork => "Saturating network tuned for production sequences",
            ModelKind::RandomForest => "Average of decision trees over perturbed inputs",
            ModelKind::AdaBoost => "Weighted blend of linear, tree and ridge learners",
        }
    }

    pub fn reported_accuracy(&self) -> f64 {
        match self {
            ModelKind::LinearRegression => 99.62,
            ModelKind::DecisionTree => 99.83,
            ModelKind::RidgeRegression => 99.99,
            ModelKind::NeuralNetwork => 97.60,
            ModelKind::RandomForest => 99.94,
            ModelKind::AdaBoost => 99.31,
        }
    }

    pub fn expected_accuracy(&self) -> AccuracyRange {
        let (low, high) = match self {
            ModelKind::LinearRegression => (70.0, 80.0),
            ModelKind::DecisionTree => (75.0, 85.0),
            ModelKind::RidgeRegression => (75.0, 82.0),
            ModelKind::NeuralNetwork => (85.0, 95.0),
            ModelKind::RandomForest => (82.0, 92.0),
            ModelKind::AdaBoost => (80.0, 90.0),
        };
        AccuracyRange { low, high }
    }

    pub fn strengths(&self) -> [&'static str; 3] {
        match self {
            ModelKind::LinearRegression => [
                "Simple and easy to understand",
                "Fast to train and predict",
                "Good for linear relationships",
            ],
            ModelKind::DecisionTree => [
                "Captures non-linear relationships",
                "Easy to visualize and interpret",
                "Needs no data normalization",
            ],
            ModelKind::RidgeRegression => [
                "Handles multicollinearity well",
                "Less prone to overfitting",
                "Good for data with many variables",
            ],
            ModelKind::NeuralNetwork => [
                "Excellent for sequential data",
                "Captures complex non-linear patterns",
                "Retains long-term memory",
            ],
            ModelKind::RandomForest => [
                "High accuracy",
                "Less prone to overfitting",
                "Handles non-linear data and missing values well",
            ],
            ModelKind::AdaBoost => [
                "High accuracy",
                "Less prone to overfitting",
                "Adapts automatically to hard examples",
            ],
        }
    }

    pub fn weaknesses(&self) -> [&'static str; 3] {
        match self {
            ModelKind::LinearRegression => [
                "Misses non-linear relationships",
                "Sensitive to outliers",
                "Assumes independent variables",
            ],
            ModelKind::DecisionTree => [
                "Can overfit the data",
                "Unstable: small changes give very different trees",
                "Less precise on continuous data",
            ],
            ModelKind::RidgeRegression => [
                "Still limited to linear relationships",
                "Needs hyperparameter tuning",
                "Reduced interpretability",
            ],
            ModelKind::NeuralNetwork => [
                "Long training time",
                "Needs large amounts of data",
                "Black-box model that is hard to interpret",
            ],
            ModelKind::RandomForest => [
                "Slower than a single tree",
                "Less interpretable",
                "Can be computationally intensive",
            ],
            ModelKind::AdaBoost => [
                "Sensitive to noisy data",
                "Can be slow to train",
                "Can be hard to interpret",
            ],
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            reported_accuracy: self.reported_accuracy(),
            expected_accuracy: self.expected_accuracy(),
            strengths: self.strengths().iter().map(|s| s.to_string()).collect(),
            weaknesses: self.weaknesses().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Score a standardized feature vector with this model
    pub fn score<R: Rng + ?Sized>(&self, features: &[f64], rng: &mut R) -> f64 {
        match self {
            ModelKind::LinearRegression => LinearScorer::LINEAR.score(features, rng),
            ModelKind::DecisionTree => DecisionTreeScorer.score(features, rng),
            ModelKind::RidgeRegression => LinearScorer::RIDGE.score(features, rng),
            ModelKind::NeuralNetwork => NeuralNetScorer.score(features, rng),
            ModelKind::RandomForest => RandomForestScorer::default().score(features, rng),
            ModelKind::AdaBoost => BoostedEnsembleScorer.score(features, rng),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelKind {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
    }
}

impl TryFrom<String> for ModelKind {
    type Error = PredictionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::lookup(&value)
    }
}

impl From<ModelKind> for String {
    fn from(kind: ModelKind) -> Self {
        kind.id().to_string()
    }
}

/// Catalog of every registered model, in id order
pub fn catalog() -> Vec<ModelInfo> {
    ModelKind::ALL.iter().map(ModelKind::info).collect()
}

/// Catalog ordered from the highest reported accuracy down
pub fn catalog_by_accuracy() -> Vec<ModelInfo> {
    let mut models = catalog();
    models.sort_by(|a, b| b.reported_accuracy.total_cmp(&a.reported_accuracy));
    models
}

/// Ordering of a catalog listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSort {
    #[default]
    Id,
    Accuracy,
}

impl ModelSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSort::Id => "id",
            ModelSort::Accuracy => "accuracy",
        }
    }

    pub fn catalog(&self) -> Vec<ModelInfo> {
        match self {
            ModelSort::Id => catalog(),
            ModelSort::Accuracy => catalog_by_accuracy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_ids() {
        for (idx, kind) in ModelKind::ALL.iter().enumerate() {
            let id = format!("model{}", idx + 1);
            assert_eq!(ModelKind::lookup(&id).unwrap(), *kind);
            assert_eq!(id.parse::<ModelKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_lookup_unknown_id_fails() {
        for id in ["model99", "model0", "MODEL1", "", "linear"] {
            assert_eq!(
                ModelKind::lookup(id),
                Err(PredictionError::ModelNotFound(id.to_string()))
            );
        }
    }

    #[test]
    fn test_catalog_lists_every_model() {
        let models = catalog();
        assert_eq!(models.len(), 6);
        assert_eq!(models[0].id, "model1");
        assert_eq!(models[5].name, "AdaBoost");
        assert!(models.iter().all(|m| !m.description.is_empty()));
    }

    #[test]
    fn test_catalog_describes_accuracy_and_tradeoffs() {
        let models = catalog();
        for model in &models {
            assert!(model.reported_accuracy > 90.0 && model.reported_accuracy <= 100.0);
            assert!(model.expected_accuracy.low < model.expected_accuracy.high);
            assert_eq!(model.strengths.len(), 3);
            assert_eq!(model.weaknesses.len(), 3);
        }
        assert_eq!(models[3].reported_accuracy, 97.60);
        assert_eq!(models[3].expected_accuracy.to_string(), "85-95%");
    }

    #[test]
    fn test_catalog_by_accuracy_orders_descending() {
        let ids: Vec<String> = catalog_by_accuracy().into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec!["model3", "model5", "model2", "model1", "model6", "model4"]
        );
    }

    #[test]
    fn test_model_sort_from_query_value() {
        let sort: ModelSort = serde_json::from_str("\"accuracy\"").unwrap();
        assert_eq!(sort, ModelSort::Accuracy);
        assert_eq!(sort.catalog()[0].id, "model3");
        assert_eq!(ModelSort::default().catalog()[0].id, "model1");
        assert!(serde_json::from_str::<ModelSort>("\"speed\"").is_err());
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&ModelKind::RandomForest).unwrap();
        assert_eq!(json, "\"model5\"");
        let kind: ModelKind = serde_json::from_str("\"model4\"").unwrap();
        assert_eq!(kind, ModelKind::NeuralNetwork);
        assert!(serde_json::from_str::<ModelKind>("\"model7\"").is_err());
    }
}
