//! Sleighbound Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sleighbound_engine::api;
use sleighbound_engine::infrastructure::{
    config::AppConfig, gemini::GeminiClient, replicate::ReplicateClient,
};
use sleighbound_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sleighbound_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sleighbound Engine");

    // Missing credentials stop the process here rather than failing per request
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    // Create infrastructure clients
    let llm = Arc::new(GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_model,
        &config.gemini_api_key,
    ));
    let image_gen = Arc::new(ReplicateClient::new(
        &config.replicate_base_url,
        &config.replicate_model,
        &config.replicate_api_token,
    ));
    tracing::info!(
        text_model = %config.gemini_model,
        image_model = %config.replicate_model,
        image_cache_capacity = config.image_cache_capacity,
        "Model clients configured"
    );

    let app = Arc::new(App::new(llm, image_gen, config.image_cache_capacity));

    let router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http())
        .layer(api::cors::cors_layer(config.cors_allowed_origins.as_deref()));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
