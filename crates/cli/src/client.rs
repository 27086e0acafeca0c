//! API client for communicating with the prediction service

use predictor_lib::{
    CowProfile, HerdPrediction, MilkingRecord, ModelInfo, ModelSort, PredictionOutcome,
    PredictionRequest,
};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Errors raised while talking to the prediction service
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// API client for the prediction service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path)?;
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Service errors carry an `error` field; fall back to the raw body
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    pub async fn list_models(&self, sort: ModelSort) -> Result<ModelList> {
        let path = match sort {
            ModelSort::Id => "api/v1/models".to_string(),
            ModelSort::Accuracy => format!("api/v1/models?sort={}", sort.as_str()),
        };
        self.get(&path).await
    }

    pub async fn predict(&self, body: &PredictBody) -> Result<PredictionOutcome> {
        self.post("api/v1/predictions", body).await
    }

    pub async fn predict_herd(&self, body: &HerdRequest) -> Result<HerdPrediction> {
        self.post("api/v1/predictions/herd", body).await
    }
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictBody {
    #[serde(flatten)]
    pub request: PredictionRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_production: Option<f64>,
}

/// Herd input as read from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdFile {
    pub cows: Vec<CowProfile>,
    #[serde(default)]
    pub records: Vec<MilkingRecord>,
    #[serde(default)]
    pub actuals: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(flatten)]
    pub herd: HerdFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
