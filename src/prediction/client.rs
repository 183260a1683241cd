use super::types::*;
use crate::{Result, config::ReplicateConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Starts a prediction. Accepted only on `201 Created`.
    async fn create_prediction(
        &self,
        api_key: &str,
        request: &CreatePredictionRequest,
    ) -> Result<ApiReply<Prediction>>;

    /// Fetches the current state of a prediction. Accepted only on `200 OK`.
    async fn get_prediction(&self, api_key: &str, id: &str) -> Result<ApiReply<Prediction>>;
}

pub struct ReplicateClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReplicateClient {
    pub fn new(config: &ReplicateConfig) -> Self {
        Self::with_client(reqwest::Client::new(), &config.base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/predictions", self.base_url)
    }

    fn prediction_endpoint(&self, id: &str) -> String {
        format!("{}/predictions/{}", self.base_url, id)
    }

    async fn read_reply(
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<ApiReply<Prediction>> {
        let status = response.status();
        if status != expected {
            return Ok(ApiReply::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let prediction: Prediction = serde_json::from_slice(&body)?;
        Ok(ApiReply::Accepted(prediction))
    }
}

#[async_trait]
impl PredictionService for ReplicateClient {
    async fn create_prediction(
        &self,
        api_key: &str,
        request: &CreatePredictionRequest,
    ) -> Result<ApiReply<Prediction>> {
        let endpoint = self.predictions_endpoint();
        debug!("Creating prediction at {} with version {}", endpoint, request.version);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let reply = Self::read_reply(response, StatusCode::CREATED).await?;
        if let ApiReply::Accepted(prediction) = &reply {
            debug!(
                "Prediction created: id={:?} status={:?}",
                prediction.id, prediction.status
            );
        }
        Ok(reply)
    }

    async fn get_prediction(&self, api_key: &str, id: &str) -> Result<ApiReply<Prediction>> {
        let endpoint = self.prediction_endpoint(id);
        debug!("Polling prediction {}", id);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(api_key)
            .send()
            .await?;

        Self::read_reply(response, StatusCode::OK).await
    }
}
