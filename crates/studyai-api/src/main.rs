//! StudyAI API Server
//!
//! HTTP server for web/PDF summarization and quiz generation.

use std::sync::Arc;
use studyai_api::{create_router, state::AppState};
use studyai_core::config::{AppConfig, LoggingConfig};

/// Environment variable naming an optional TOML config file
const CONFIG_FILE_VAR: &str = "STUDYAI_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match std::env::var(CONFIG_FILE_VAR) {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    let addr = config.server.bind_addr();
    tracing::info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        scratch_dir = %config.server.scratch_dir().display(),
        "Configuration loaded"
    );

    // Create application state
    let state = Arc::new(AppState::from_config(config)?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("StudyAI API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&logging.level).into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Filter used when `RUST_LOG` is not set
fn default_filter(level: &str) -> String {
    format!("studyai_api={level},studyai_pipeline={level},tower_http=debug")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
