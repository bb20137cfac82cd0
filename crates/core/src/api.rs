//! Client for the prediction/result service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    models::{DrawResult, Prediction},
};

const RESULTS_PATH: &str = "/powerball/results";
const PREDICTIONS_PATH: &str = "/powerball/predictions";

/// Failures talking to the service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Trimmed response body.
        body: String,
    },
    /// The response body was not the expected JSON.
    #[error("failed to decode {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
}

/// The two operations the front end needs from the service.
#[async_trait]
pub trait DrawService: Send + Sync {
    /// Record one draw result. The response body is ignored.
    async fn submit_result(&self, result: &DrawResult) -> Result<(), ApiError>;

    /// Fetch the current predictions.
    async fn get_predictions(&self) -> Result<Vec<Prediction>, ApiError>;
}

/// HTTP implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct PowerballClient {
    http: Client,
    base_url: String,
}

impl PowerballClient {
    /// Client using the configured base URL and request timeout.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(http, &config.api_base_url))
    }

    /// Client around an existing `reqwest::Client`.
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

#[async_trait]
impl DrawService for PowerballClient {
    async fn submit_result(&self, result: &DrawResult) -> Result<(), ApiError> {
        let url = self.endpoint(RESULTS_PATH);
        debug!(%url, draw = %result.label(), "POST result");
        let response = self.http.post(&url).json(result).send().await?;
        let response = Self::check(response).await?;
        info!(status = response.status().as_u16(), "Result accepted by service");
        Ok(())
    }

    async fn get_predictions(&self) -> Result<Vec<Prediction>, ApiError> {
        let url = self.endpoint(PREDICTIONS_PATH);
        debug!(%url, "GET predictions");
        let response = Self::check(self.http.get(&url).send().await?).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let predictions: Vec<Prediction> =
            response.json().await.map_err(|source| ApiError::Decode {
                what: "predictions",
                source,
            })?;
        info!(count = predictions.len(), "Predictions fetched");
        Ok(predictions)
    }
}
