mod chat;
mod config;
mod errors;
mod llm_client;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GroqClient;
use crate::resume::load_resume;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio API v{}", env!("CARGO_PKG_VERSION"));

    if config.groq_api_key.is_empty() {
        warn!("GROQ_API_KEY is not set; chat requests will fail until it is configured");
    }

    let provider = GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Requests must never see an unloaded resume, so finish loading before binding.
    let resume = load_resume(&config.resume_path).await;

    let state = AppState {
        provider: Arc::new(provider),
        resume: Arc::new(resume),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Backend server running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
