pub mod handlers;

use crate::{Result, config::Config, handler::GenerationHandler};
use axum::{
    Router,
    routing::{any, get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn router(handler: Arc<GenerationHandler>) -> Router {
    let app_state = handlers::AppState { handler };

    Router::new()
        .route("/invoke", post(handlers::invoke))
        .route("/generate-image", any(handlers::generate_image))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run(config: Config) -> Result<()> {
    if config.replicate.api_key().is_none() {
        warn!("Replicate API key is not configured; generation requests will fail");
    }

    let handler = Arc::new(GenerationHandler::new(config.replicate.clone()));
    info!(
        "Polling up to {} times every {:?}",
        handler.policy().max_attempts,
        handler.policy().interval
    );

    let app = router(handler);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
