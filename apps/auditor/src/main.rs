mod audit;
mod config;
mod errors;
mod llm_client;
mod render;
mod routes;
mod rubric;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::audit::evaluator::GeminiEvaluator;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting IDVS auditor v{}", env!("CARGO_PKG_VERSION"));

    // A missing key is reported per audit, not at startup
    let evaluator = GeminiEvaluator::from_config(&config)?;
    if evaluator.is_configured() {
        info!(
            "Gemini evaluator initialized (model: {}, rubric: {})",
            llm_client::MODEL,
            rubric::RUBRIC_VERSION
        );
    } else {
        warn!("GEMINI_API_KEY is not set; audits will fail until it is configured");
    }

    let state = AppState::new(Arc::new(evaluator), config.audit_timeout);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
