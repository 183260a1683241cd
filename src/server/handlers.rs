use crate::{
    Error,
    handler::{GatewayRequest, GatewayResponse, GenerationHandler},
};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<GenerationHandler>,
}

/// Takes a full gateway event and returns the gateway response document.
pub async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<GatewayRequest>,
) -> Json<GatewayResponse> {
    info!("Received gateway invocation: {}", request.http_method);
    Json(state.handler.handle(request).await)
}

/// Plain HTTP entry point; the gateway response becomes the HTTP response.
pub async fn generate_image(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> GatewayResponse {
    info!("Received {} /generate-image", method);

    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) if method == Method::POST => {
            let err = Error::invalid_request(format!("request body is not valid UTF-8: {}", e));
            warn!("{}", err);
            return GatewayResponse::error(500, err.to_string());
        }
        // Only POST reads the body
        Err(_) => String::new(),
    };

    let request = GatewayRequest::new(method.as_str(), Some(body));
    state.handler.handle(request).await
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Dropping invalid response header {}", name),
            }
        }

        response
    }
}
