use anyhow::{Context, Result};
use api::config::{AppConfig, LogFormat};
use api::{AppState, Metrics, create_router};
use extract::{Extractor, OllamaClient};
use pipeline::Pipeline;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
    }

    config
        .pipeline
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid pipeline configuration")?;

    // Create extractor
    let llm_client = OllamaClient::new(config.llm.base_url.clone(), config.llm.model.clone());
    let extractor = Extractor::new(llm_client);
    let model = extractor.model().to_string();

    let pipeline = Pipeline::new(Arc::new(extractor), &config.pipeline);

    let state = AppState {
        pipeline: Arc::new(pipeline),
        metrics: Metrics::new(),
        render: config.render.clone(),
        model,
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!(
        addr = %config.server.bind_addr,
        model = %config.llm.model,
        char_limit = config.pipeline.char_limit,
        "Server listening"
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
