//! Milk Predictor - HTTP service for milk production predictions
//!
//! Serves single-cow and herd predictions, accuracy scoring and
//! Prometheus metrics.

use anyhow::Result;
use milk_predictor::{
    api,
    config::{LogFormat, ServiceConfig},
};
use predictor_lib::{predictor::catalog, PredictorMetrics, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration decides the log format, so load it before tracing
    let config = ServiceConfig::load()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    info!(
        addr = %config.listen_addr(),
        default_model = %config.default_model,
        "Service configured"
    );

    let metrics = PredictorMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);
    logger.log_startup(SERVICE_VERSION, catalog().len());

    let app_state = Arc::new(api::AppState::new(
        metrics,
        logger.clone(),
        config.default_model.clone(),
    ));

    let shutdown_logger = logger.clone();
    let shutdown = async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    };

    api::serve(&config.listen_addr(), app_state, shutdown).await?;
    info!("Shutting down");

    Ok(())
}
