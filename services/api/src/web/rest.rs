//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use study_companion_core::{
    grade_quiz, ContentKind, Difficulty, Flashcard, GeneratedContent, GenerationError,
    GenerationRequest, QuizQuestion, QuizResult, StudyPlan, StudyPlanDay,
};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

/// Shown to the user for every failure that is not their input's fault.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate content. Please try again.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_study_plan_handler,
        create_flashcards_handler,
        create_quiz_handler,
        grade_quiz_handler,
        generate_handler,
    ),
    components(
        schemas(
            CreateStudyPlanRequest, CreateFlashcardsRequest, CreateQuizRequest, GradeQuizRequest,
            StudyPlan, StudyPlanDay, Flashcard, QuizQuestion, QuizResult, Difficulty,
            ContentKind, GenerationRequest, GeneratedContent
        )
    ),
    tags(
        (name = "Study Companion API", description = "AI-generated study plans, flashcards and quizzes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyPlanRequest {
    pub exam_name: String,
    pub days_until_exam: u32,
    pub weaknesses: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFlashcardsRequest {
    pub topic: String,
    /// Defaults to 5.
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Defaults to 5.
    #[serde(default)]
    pub count: Option<u32>,
}

/// A finished quiz: the questions as generated and the option picked for each.
#[derive(Deserialize, ToSchema)]
pub struct GradeQuizRequest {
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
    pub answers: Vec<Option<usize>>,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Maps a core failure onto the response the views understand. Input errors
/// are explained; everything else collapses into one generic message.
fn failure_response(kind: ContentKind, err: GenerationError) -> (StatusCode, String) {
    if err.is_caller_error() {
        return (StatusCode::BAD_REQUEST, err.to_string());
    }
    error!("Failed to generate {}: {:?}", kind, err);
    (StatusCode::BAD_GATEWAY, GENERATION_FAILED_MESSAGE.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a day-by-day study plan for an upcoming exam.
///
/// Responds with `null` when the provider produced nothing.
#[utoipa::path(
    post,
    path = "/study-plans",
    request_body = CreateStudyPlanRequest,
    responses(
        (status = 200, description = "The generated plan, or null", body = StudyPlan),
        (status = 400, description = "Bad request (e.g., empty exam name)"),
        (status = 502, description = "The provider call failed")
    )
)]
pub async fn create_study_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateStudyPlanRequest>,
) -> HandlerResult<Option<StudyPlan>> {
    app_state
        .generator
        .generate_study_plan(
            &payload.exam_name,
            payload.days_until_exam,
            &payload.weaknesses,
        )
        .await
        .map(Json)
        .map_err(|e| failure_response(ContentKind::StudyPlan, e))
}

/// Generate a flashcard deck for a topic.
#[utoipa::path(
    post,
    path = "/flashcards",
    request_body = CreateFlashcardsRequest,
    responses(
        (status = 200, description = "The generated deck, possibly empty", body = [Flashcard]),
        (status = 400, description = "Bad request (e.g., empty topic)"),
        (status = 502, description = "The provider call failed")
    )
)]
pub async fn create_flashcards_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateFlashcardsRequest>,
) -> HandlerResult<Vec<Flashcard>> {
    app_state
        .generator
        .generate_flashcards(&payload.topic, payload.count)
        .await
        .map(Json)
        .map_err(|e| failure_response(ContentKind::FlashcardDeck, e))
}

/// Generate a multiple-choice quiz for a topic at a difficulty level.
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 200, description = "The generated questions, possibly empty", body = [QuizQuestion]),
        (status = 400, description = "Bad request (e.g., empty topic)"),
        (status = 502, description = "The provider call failed")
    )
)]
pub async fn create_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateQuizRequest>,
) -> HandlerResult<Vec<QuizQuestion>> {
    app_state
        .generator
        .generate_quiz(&payload.topic, payload.difficulty, payload.count)
        .await
        .map(Json)
        .map_err(|e| failure_response(ContentKind::Quiz, e))
}

/// Score a finished quiz.
#[utoipa::path(
    post,
    path = "/quizzes/grade",
    request_body = GradeQuizRequest,
    responses(
        (status = 200, description = "The quiz score", body = QuizResult)
    )
)]
pub async fn grade_quiz_handler(Json(payload): Json<GradeQuizRequest>) -> Json<QuizResult> {
    let result = grade_quiz(&payload.topic, &payload.questions, &payload.answers);
    info!(
        "Graded quiz on '{}': {}/{}",
        result.topic, result.correct_answers, result.total_questions
    );
    Json(result)
}

/// Generate any content kind from a tagged request.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "The generated content, tagged by kind", body = GeneratedContent),
        (status = 400, description = "Bad request"),
        (status = 502, description = "The provider call failed")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> HandlerResult<GeneratedContent> {
    let kind = request.kind();
    app_state
        .generator
        .generate(request)
        .await
        .map(Json)
        .map_err(|e| failure_response(kind, e))
}
