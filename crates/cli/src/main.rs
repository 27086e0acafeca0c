//! Milk Production Predictor CLI
//!
//! A command-line tool for listing models, requesting single-cow and
//! herd predictions, and scoring prediction accuracy.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analysis, herd, predict};
use predictor_lib::{AccuracyFilter, ModelSort};
use std::path::PathBuf;

/// Milk Production Predictor CLI
#[derive(Parser)]
#[command(name = "milkp")]
#[command(author, version, about = "CLI for Milk Production Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via MILKP_API_URL env var)
    #[arg(long, env = "MILKP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available prediction models
    Models {
        /// Order of the listing
        #[arg(long, value_enum, default_value = "id")]
        sort: predict::SortBy,
    },

    /// Predict milk production for one cow
    Predict(predict::PredictArgs),

    /// Predict every active, milking cow of a herd
    Herd {
        /// JSON file with cows, milking records and known actuals
        #[arg(long)]
        file: PathBuf,

        /// Model identifier (service default if not specified)
        #[arg(long, short)]
        model: Option<String>,
    },

    /// Score a prediction against the actual volume
    Accuracy {
        /// Predicted liters
        #[arg(value_parser = analysis::parse_liters)]
        predicted: f64,

        /// Actual liters
        #[arg(value_parser = analysis::parse_liters)]
        actual: f64,
    },

    /// Summarize accuracy over stored predictions
    Summary {
        /// JSON file with prediction records
        #[arg(long)]
        file: PathBuf,

        /// Only predictions for this cow
        #[arg(long)]
        cow: Option<String>,

        /// Only predictions from the last N days
        #[arg(long)]
        days: Option<u32>,
    },
}

fn connect(api_url: &str, verbose: bool) -> Result<client::ApiClient> {
    if verbose {
        output::print_info(&format!("Using API at {}", api_url));
    }
    Ok(client::ApiClient::new(api_url)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;
    let api_url = config.api_url(cli.api_url);

    // Execute command
    match cli.command {
        Commands::Models { sort } => {
            let client = connect(&api_url, cli.verbose)?;
            predict::list_models(&client, ModelSort::from(sort), cli.format).await?;
        }
        Commands::Predict(args) => {
            let local = args.local;
            let body = {
                let model = config.model(args.model.clone());
                args.into_body(model)
            };
            if local {
                predict::predict_local(&body, cli.format)?;
            } else {
                let client = connect(&api_url, cli.verbose)?;
                predict::predict_remote(&client, &body, cli.format).await?;
            }
        }
        Commands::Herd { file, model } => {
            let client = connect(&api_url, cli.verbose)?;
            let model = model.or_else(|| config.default_model.clone());
            herd::predict_herd(&client, &file, model, cli.format).await?;
        }
        Commands::Accuracy { predicted, actual } => {
            analysis::show_accuracy(predicted, actual, cli.format)?;
        }
        Commands::Summary { file, cow, days } => {
            let filter = AccuracyFilter { cow_id: cow, days };
            analysis::show_summary(&file, &filter, cli.format)?;
        }
    }

    Ok(())
}
