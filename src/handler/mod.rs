mod types;

pub use types::*;

use crate::{
    Error, Result,
    config::ReplicateConfig,
    prediction::{
        ApiReply, CreatePredictionRequest, PredictionService, PredictionStatus, ReplicateClient,
    },
    retry::{Attempt, RetryOutcome, RetryPolicy, Sleeper, TokioSleeper},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Terminal result of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Image(String),
    MissingPrompt,
    MissingApiKey,
    StartFailed { status: u16 },
    Failed,
    TimedOut,
}

impl GenerationOutcome {
    pub fn into_response(self) -> GatewayResponse {
        match self {
            Self::Image(url) => GatewayResponse::image(url),
            Self::MissingPrompt => GatewayResponse::error(400, "Prompt is required"),
            Self::MissingApiKey => GatewayResponse::error(500, "API key not configured"),
            Self::StartFailed { .. } => GatewayResponse::error(500, "Failed to start generation"),
            Self::Failed => GatewayResponse::error(500, "Generation failed"),
            Self::TimedOut => GatewayResponse::error(500, "Generation timeout"),
        }
    }
}

pub struct GenerationHandler {
    config: ReplicateConfig,
    service: Arc<dyn PredictionService>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GenerationHandler {
    /// Handler talking to the configured Replicate endpoint with real-time polling.
    pub fn new(config: ReplicateConfig) -> Self {
        let service = Arc::new(ReplicateClient::new(&config));
        Self::with_service(config, service)
    }

    pub fn with_service(config: ReplicateConfig, service: Arc<dyn PredictionService>) -> Self {
        let policy = RetryPolicy::from(&config.poll);
        Self {
            config,
            service,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn handle(&self, request: GatewayRequest) -> GatewayResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("generate_image", %request_id, method = %request.http_method);

        async move {
            match request.http_method.as_str() {
                "OPTIONS" => return GatewayResponse::preflight(),
                "POST" => {}
                other => {
                    warn!("Rejecting method {}", other);
                    return GatewayResponse::error(405, "Method not allowed");
                }
            }

            match self.generate(request.body.as_deref()).await {
                Ok(outcome) => {
                    info!("Generation request finished: {:?}", outcome);
                    outcome.into_response()
                }
                Err(e) => {
                    error!("Generation request failed: {}", e);
                    GatewayResponse::error(500, e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn generate(&self, body: Option<&str>) -> Result<GenerationOutcome> {
        let body = body.filter(|body| !body.is_empty()).unwrap_or("{}");
        let payload: Value = serde_json::from_str(body)?;
        let fields = payload
            .as_object()
            .ok_or_else(|| Error::invalid_request("request body must be a JSON object"))?;

        let Some(prompt) = fields
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|prompt| !prompt.is_empty())
        else {
            return Ok(GenerationOutcome::MissingPrompt);
        };

        let Some(api_key) = self.config.api_key() else {
            error!("Replicate API key is not configured");
            return Ok(GenerationOutcome::MissingApiKey);
        };

        debug!("Starting generation for prompt of {} chars", prompt.len());

        let request = CreatePredictionRequest::new(&self.config.model, prompt);
        let prediction = match self.service.create_prediction(api_key, &request).await? {
            ApiReply::Accepted(prediction) => prediction,
            ApiReply::Rejected { status } => {
                warn!("Prediction creation rejected with status {}", status);
                return Ok(GenerationOutcome::StartFailed { status });
            }
        };

        let id = prediction
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::upstream("prediction response missing id"))?;
        info!("Prediction {} started", id);

        let id = id.as_str();
        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), move |attempt| {
                self.poll_once(api_key, id, attempt)
            })
            .await?;

        Ok(match outcome {
            RetryOutcome::Completed { value, attempts } => {
                debug!("Prediction {} settled after {} polls", id, attempts);
                value
            }
            RetryOutcome::Aborted { attempts } => {
                warn!("Polling prediction {} aborted at attempt {}", id, attempts);
                GenerationOutcome::TimedOut
            }
            RetryOutcome::Exhausted { attempts } => {
                warn!("Prediction {} still running after {} polls", id, attempts);
                GenerationOutcome::TimedOut
            }
        })
    }

    async fn poll_once(
        &self,
        api_key: &str,
        id: &str,
        attempt: u32,
    ) -> Result<Attempt<GenerationOutcome>> {
        let prediction = match self.service.get_prediction(api_key, id).await? {
            ApiReply::Accepted(prediction) => prediction,
            ApiReply::Rejected { status } => {
                warn!("Status check for {} returned {}", id, status);
                return Ok(Attempt::Abort);
            }
        };

        debug!(attempt, status = ?prediction.status, "Polled prediction {}", id);

        Ok(match prediction.status {
            PredictionStatus::Succeeded => match prediction.image_url() {
                Some(url) => Attempt::Done(GenerationOutcome::Image(url.to_string())),
                None => Attempt::Retry,
            },
            PredictionStatus::Failed => {
                warn!("Prediction {} failed: {:?}", id, prediction.error);
                Attempt::Done(GenerationOutcome::Failed)
            }
            _ => Attempt::Retry,
        })
    }
}
