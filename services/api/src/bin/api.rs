//! services/api/src/bin/api.rs

use api_lib::{
    adapters::OpenAiStudyAdapter,
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use std::sync::Arc;
use study_companion_core::StudyContentGenerator;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Provider Adapter ---
    let study_adapter = Arc::new(OpenAiStudyAdapter::from_credentials(
        &config.generation_api_base,
        config.require_api_key()?,
    ));
    let generator = StudyContentGenerator::new(study_adapter, config.generation_model.clone());
    info!(
        "Generating with model '{}' via {}",
        config.generation_model, config.generation_api_base
    );

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        generator,
    });
    let app = router(app_state)?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
