//! Model catalog and single-cow prediction commands

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use predictor_lib::{MilkPredictor, ModelSort, PredictionOutcome, PredictionRequest};
use tabled::Tabled;

use crate::client::{ApiClient, PredictBody};
use crate::output::{
    color_accuracy, format_accuracy, format_liters, print_json, print_rows, print_success,
    OutputFormat,
};

/// Row for models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Reported")]
    reported: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Catalog ordering accepted by `milkp models --sort`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortBy {
    /// Model id order
    #[default]
    Id,
    /// Highest reported accuracy first
    Accuracy,
}

impl From<SortBy> for ModelSort {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Id => ModelSort::Id,
            SortBy::Accuracy => ModelSort::Accuracy,
        }
    }
}

/// Cow and session attributes for a single prediction
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Model identifier (model1..model6)
    #[arg(long, short)]
    pub model: Option<String>,

    /// Cow identifier, echoed in service logs
    #[arg(long)]
    pub cow_id: Option<String>,

    #[arg(long, default_value = "Holstein")]
    pub breed: String,

    /// Body weight (kg)
    #[arg(long)]
    pub weight: f64,

    /// Age (months)
    #[arg(long)]
    pub age: f64,

    /// Days in lactation
    #[arg(long)]
    pub lactation_days: f64,

    /// Ambient temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: f64,

    /// Udder humidity (%)
    #[arg(long)]
    pub humidity: f64,

    /// Feed for this session (kg)
    #[arg(long)]
    pub feed: f64,

    /// Weekly feed (kg)
    #[arg(long)]
    pub weekly_feed: Option<f64>,

    /// Recent productions in liters, newest first (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub recent: Vec<f64>,

    /// Known actual production, scores the prediction's accuracy
    #[arg(long)]
    pub actual: Option<f64>,

    /// Score in-process instead of calling the service
    #[arg(long)]
    pub local: bool,
}

impl PredictArgs {
    pub fn into_body(self, model_id: String) -> PredictBody {
        PredictBody {
            request: PredictionRequest {
                cow_id: self.cow_id,
                model_id,
                breed: self.breed,
                weight_kg: Some(self.weight),
                age_months: Some(self.age),
                lactation_days: Some(self.lactation_days),
                temperature: Some(self.temperature),
                udder_humidity: Some(self.humidity),
                feed_amount: Some(self.feed),
                weekly_feed_kg: self.weekly_feed,
                recent_productions: self.recent,
            },
            actual_production: self.actual,
        }
    }
}

/// List the registered models
pub async fn list_models(client: &ApiClient, sort: ModelSort, format: OutputFormat) -> Result<()> {
    let result = client.list_models(sort).await?;

    match format {
        OutputFormat::Json => print_json(&result.models)?,
        OutputFormat::Table => {
            let rows: Vec<ModelRow> = result
                .models
                .into_iter()
                .map(|m| ModelRow {
                    id: m.id,
                    name: m.name,
                    reported: format_accuracy(Some(m.reported_accuracy)),
                    expected: m.expected_accuracy.to_string(),
                    description: m.description,
                })
                .collect();
            print_rows(rows);
            println!("\nTotal: {} models", result.total);
        }
    }

    Ok(())
}

/// Predict through the service
pub async fn predict_remote(
    client: &ApiClient,
    body: &PredictBody,
    format: OutputFormat,
) -> Result<()> {
    let outcome = client.predict(body).await?;
    print_outcome(&body.request.model_id, &outcome, format)
}

/// Predict in-process with the bundled models
pub fn predict_local(body: &PredictBody, format: OutputFormat) -> Result<()> {
    let outcome = MilkPredictor::new().predict_outcome(&body.request, body.actual_production);
    print_outcome(&body.request.model_id, &outcome, format)
}

fn print_outcome(model_id: &str, outcome: &PredictionOutcome, format: OutputFormat) -> Result<()> {
    if let Some(error) = &outcome.error {
        bail!("{}", error);
    }

    match format {
        OutputFormat::Json => print_json(outcome)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Predicted {} with {}",
                format_liters(outcome.prediction),
                model_id
            ));
            if outcome.accuracy.is_some() {
                println!("Accuracy: {}", color_accuracy(outcome.accuracy));
            }
        }
    }

    Ok(())
}
