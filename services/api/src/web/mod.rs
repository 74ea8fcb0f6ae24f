//! services/api/src/web/mod.rs
//!
//! Assembles the HTTP router consumed by the planner, flashcard and quiz views.

pub mod rest;
pub mod state;

pub use rest::{
    create_flashcards_handler, create_quiz_handler, create_study_plan_handler, generate_handler,
    grade_quiz_handler,
};

use crate::config::ConfigError;
use crate::error::ApiError;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::{routing::post, Router};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the full application router, including the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let api_router = Router::new()
        .route("/study-plans", post(create_study_plan_handler))
        .route("/flashcards", post(create_flashcards_handler))
        .route("/quizzes", post(create_quiz_handler))
        .route("/quizzes/grade", post(grade_quiz_handler))
        .route("/generate", post(generate_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
