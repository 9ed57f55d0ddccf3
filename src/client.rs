//! HTTP client for a running predictor service.

use crate::api::handlers::{HealthResponse, PredictionResponse};
use crate::ml::ModelMetadata;
use crate::models::CustomerProfile;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with its JSON error body
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Thin wrapper over the JSON API
#[derive(Debug, Clone)]
pub struct ChurnClient {
    http: Client,
    endpoint: String,
}

impl ChurnClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST /v1/predictions
    pub async fn predict(
        &self,
        profile: &CustomerProfile,
    ) -> Result<PredictionResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/v1/predictions", self.endpoint))
            .json(profile)
            .send()
            .await?;
        decode(response).await
    }

    /// GET /v1/model
    pub async fn model(&self) -> Result<ModelMetadata, ClientError> {
        let response = self
            .http
            .get(format!("{}/v1/model", self.endpoint))
            .send()
            .await?;
        decode(response).await
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.endpoint))
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => ("HTTP_ERROR".to_string(), text),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
