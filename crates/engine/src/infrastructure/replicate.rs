//! Replicate image generation client
//!
//! Implements the ImageGenPort trait using Replicate's predictions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::infrastructure::ports::{ImageGenError, ImageGenPort, ImageRequest, ImageResult};

/// Default Replicate API base URL.
pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com";

/// Default image model (`owner/name`).
pub const DEFAULT_REPLICATE_MODEL: &str = "black-forest-labs/flux-schnell";

/// Polls made after creation before giving up on a prediction.
const MAX_POLL_ATTEMPTS: u32 = 120; // 2 minutes with 1 second intervals
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client for the Replicate API
#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    model: String,
    api_token: String,
    max_poll_attempts: u32,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(base_url: &str, model: &str, api_token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minute timeout for generation
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_token: api_token.to_string(),
            max_poll_attempts: MAX_POLL_ATTEMPTS,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the polling budget (for testing).
    pub fn with_polling(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.max_poll_attempts = max_attempts;
        self.poll_interval = interval;
        self
    }

    /// Create a prediction, asking the API to hold the connection until it settles
    async fn create_prediction(&self, prompt: &str) -> Result<Prediction, ImageGenError> {
        let request = CreatePredictionRequest {
            input: PredictionInput {
                prompt: prompt.to_string(),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/models/{}/predictions",
                self.base_url, self.model
            ))
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageGenError::GenerationFailed(e.to_string()))?;

        Self::read_prediction(response).await
    }

    /// Fetch the current state of a prediction
    async fn get_prediction(&self, url: &str) -> Result<Prediction, ImageGenError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| ImageGenError::GenerationFailed(e.to_string()))?;

        Self::read_prediction(response).await
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction, ImageGenError> {
        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ImageGenError::Unavailable);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ImageGenError::GenerationFailed(format!(
                "{}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ImageGenError::GenerationFailed(e.to_string()))
    }

    /// Poll a prediction until it succeeds, fails, or the attempt budget runs out
    async fn wait_for_completion(
        &self,
        prediction: Prediction,
    ) -> Result<Prediction, ImageGenError> {
        let poll_url = prediction
            .urls
            .as_ref()
            .map(|u| u.get.clone())
            .unwrap_or_else(|| format!("{}/v1/predictions/{}", self.base_url, prediction.id));

        if let Some(settled) = prediction.settle() {
            return settled;
        }

        for attempt in 1..=self.max_poll_attempts {
            sleep(self.poll_interval).await;

            let prediction = self.get_prediction(&poll_url).await?;
            let status = prediction.status;
            if let Some(settled) = prediction.settle() {
                return settled;
            }

            tracing::trace!(attempt, ?status, "Prediction still running");
        }

        Err(ImageGenError::GenerationFailed(
            "Generation timed out".to_string(),
        ))
    }
}

#[async_trait]
impl ImageGenPort for ReplicateClient {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, ImageGenError> {
        let prediction = self.create_prediction(&request.prompt).await?;
        tracing::debug!(
            prediction_id = %prediction.id,
            status = ?prediction.status,
            "Replicate prediction created"
        );

        let prediction = self.wait_for_completion(prediction).await?;

        Ok(ImageResult {
            urls: output_urls(prediction.output.as_ref()),
        })
    }
}

/// Models return either a single URL or a list of URLs.
fn output_urls(output: Option<&serde_json::Value>) -> Vec<String> {
    match output {
        Some(serde_json::Value::String(url)) => vec![url.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Replicate API types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreatePredictionRequest {
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    output: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
    urls: Option<PredictionUrls>,
}

impl Prediction {
    /// `None` while the prediction is still running.
    fn settle(self) -> Option<Result<Prediction, ImageGenError>> {
        match self.status {
            PredictionStatus::Starting | PredictionStatus::Processing => None,
            PredictionStatus::Succeeded => Some(Ok(self)),
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                let reason = match self.error {
                    Some(serde_json::Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => format!("prediction {:?}", self.status),
                };
                Some(Err(ImageGenError::GenerationFailed(reason)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: String,
}
