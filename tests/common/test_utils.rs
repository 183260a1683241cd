use imagegen_rust::{
    config::{PollConfig, ReplicateConfig},
    handler::{GatewayRequest, GatewayResponse, GenerationHandler},
    prediction::PredictionService,
    retry::NoopSleeper,
};
use serde_json::{Value, json};
use std::sync::Arc;

pub const TEST_API_KEY: &str = "r8_test_key";

pub fn test_config(base_url: &str) -> ReplicateConfig {
    ReplicateConfig {
        base_url: base_url.to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        model: "black-forest-labs/flux-schnell".to_string(),
        poll: PollConfig::default(),
    }
}

/// Handler over `service` that polls without waiting.
pub fn handler_with(service: Arc<dyn PredictionService>) -> GenerationHandler {
    GenerationHandler::with_service(test_config("http://unused.invalid/v1"), service)
        .with_sleeper(Arc::new(NoopSleeper))
}

/// Handler talking HTTP to `base_url` that polls without waiting.
pub fn http_handler(base_url: &str) -> GenerationHandler {
    GenerationHandler::new(test_config(base_url)).with_sleeper(Arc::new(NoopSleeper))
}

pub fn post(body: Value) -> GatewayRequest {
    GatewayRequest::new("POST", Some(body.to_string()))
}

pub fn prediction_json(id: &str, status: &str, output: Value) -> Value {
    json!({
        "id": id,
        "model": "black-forest-labs/flux-schnell",
        "status": status,
        "output": output,
        "error": null,
        "urls": {
            "get": format!("https://api.replicate.com/v1/predictions/{id}"),
            "cancel": format!("https://api.replicate.com/v1/predictions/{id}/cancel")
        }
    })
}

/// Parses the JSON payload carried in a gateway response body.
pub fn body_json(response: &GatewayResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body should be JSON")
}
