use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jd_analyzer::config::Config;
use jd_analyzer::llm_client::{LlmClient, TextGenerator};
use jd_analyzer::routes::build_router;
use jd_analyzer::state::AppState;

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

    info!("Starting JD Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // A missing key is reported per request, not here
    if config.credential().is_none() {
        warn!(
            "{} is not set; analysis requests will fail until it is configured",
            config.provider.api_key_var()
        );
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config.provider));
    info!(
        "LLM client initialized (provider: {}, model: {})",
        config.provider,
        config.provider.model()
    );

    let locator = config.candidate_strategy.locator();
    info!("JSON candidate strategy: {}", locator.name());

    let state = AppState {
        config: config.clone(),
        generator,
        locator,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
