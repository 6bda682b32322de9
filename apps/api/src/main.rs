mod config;
mod errors;
mod evaluation;
mod extraction;
mod history;
mod llm_client;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::{GeminiClient, ModelClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SmartResume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. A missing key leaves the service up; evaluation requests get 503.
    let llm: Option<Arc<dyn ModelClient>> = match GeminiClient::from_config(&config)? {
        Some(client) => {
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("GOOGLE_API_KEY is not set; evaluation endpoints will be unavailable");
            None
        }
    };

    info!(
        "History file: {} (upload limit {} bytes)",
        config.history_path.display(),
        config.max_upload_bytes
    );

    // Build app state
    let state = AppState::new(config.clone(), llm, Arc::new(PdfTextExtractor));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
