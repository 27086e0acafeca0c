//! Service configuration

use anyhow::{Context, Result};
use predictor_lib::ModelKind;
use serde::Deserialize;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name reported in structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Address the HTTP API binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Model used by herd requests that do not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_service_name() -> String {
    "milk-predictor".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_model() -> String {
    ModelKind::LinearRegression.id().to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            bind_address: default_bind_address(),
            api_port: default_api_port(),
            default_model: default_model(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `MILK_*` environment variables
    pub fn load() -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("MILK").try_parsing(true))
            .build()
            .context("Failed to read MILK_* environment")?;
        Self::from_config(source)
    }

    pub fn from_config(source: config::Config) -> Result<Self> {
        let config: Self = source
            .try_deserialize()
            .context("Invalid service configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ModelKind::lookup(&self.default_model)
            .with_context(|| format!("default_model '{}' is not registered", self.default_model))?;
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let source = config::Config::builder().build().unwrap();
        let config = ServiceConfig::from_config(source).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.default_model, "model1");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let source = config::Config::builder()
            .set_override("api_port", 9100)
            .unwrap()
            .set_override("default_model", "model5")
            .unwrap()
            .set_override("log_format", "pretty")
            .unwrap()
            .build()
            .unwrap();
        let config = ServiceConfig::from_config(source).unwrap();
        assert_eq!(config.api_port, 9100);
        assert_eq!(config.default_model, "model5");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_default_model_rejected() {
        let source = config::Config::builder()
            .set_override("default_model", "model99")
            .unwrap()
            .build()
            .unwrap();
        let err = ServiceConfig::from_config(source).unwrap_err();
        assert!(format!("{:#}", err).contains("model99"));
    }
}
