//! NLQ HTTP/JSON Gateway binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nlq_client::{GeminiClient, ODataClient};
use nlq_core::{Dispatcher, Planner, QueryEngine, ResultCache, SchemaRegistry};
use nlq_gateway::{create_router, AppState, Args, GatewayConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        source = %config.source_url,
        model = %config.model,
        "Starting NLQ Gateway"
    );

    let registry = SchemaRegistry::from_json_file(&config.registry_path).with_context(|| {
        format!(
            "failed to load schema registry from {}",
            config.registry_path.display()
        )
    })?;
    if registry.is_empty() {
        anyhow::bail!("schema registry has no sources");
    }
    info!(sources = ?registry.list_sources(), "Loaded schema registry");

    // Collaborators
    let source = ODataClient::new(config.client_config()).context("invalid source settings")?;
    let generator = GeminiClient::new(config.gemini_config()).context("invalid Gemini settings")?;

    let cache = Arc::new(ResultCache::with_ttl(config.cache_ttl));
    let dispatcher =
        Dispatcher::new(Arc::new(source), cache).with_config(config.dispatcher_config());
    let planner = Planner::new(Arc::new(generator)).with_registry_validation(config.strict_plan);
    let engine = QueryEngine::new(planner, dispatcher, Arc::new(registry));

    info!(
        retry_attempts = config.retry_attempts,
        retry_delay_ms = config.retry_delay.as_millis() as u64,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        strict_plan = config.strict_plan,
        "Query engine ready"
    );

    // Create router
    let app = create_router(AppState::new(engine, config.clone()));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
