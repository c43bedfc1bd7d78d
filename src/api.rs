use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::{authenticate, owner_id, AuthConfig};
use crate::errors::{ApiError, GenerationError};
use crate::models::{
    validate_notes_text, FlashcardRequest, FlashcardResponse, FlashcardSetRecord, GenerateRequest,
    StudyPackResponse, TopicQuizResponse,
};
use crate::storage::FlashcardStore;
use crate::study_service::StudyService;
use crate::{log_api_error, log_api_start, log_api_success};

#[derive(Clone)]
pub struct AppState {
    pub study_service: StudyService,
    pub store: Arc<dyn FlashcardStore>,
    pub auth: AuthConfig,
}

/// Map a pipeline failure to the external error contract: a 500 whose
/// detail starts with the endpoint's prefix and names the specific defect.
fn generation_failure(operation: &'static str, prefix: &str, e: GenerationError) -> ApiError {
    let detail = match &e {
        GenerationError::ModelUnavailable => {
            format!("{}: no response from the AI service", prefix)
        }
        other => format!("{}: {}", prefix, other),
    };
    log_api_error!(operation, error = &e, "generation pipeline failed");
    ApiError::internal(detail)
}

/// Unwrap a JSON body extraction, turning any rejection (syntax error,
/// missing field, wrong type) into a 422 with the rejection's message.
fn require_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::unprocessable(rejection.body_text())),
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({}))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Legacy study pack endpoint, kept for older clients. Same pipeline as
/// /api/v1/generate but with the original error wording. Gated by
/// REQUIRE_AUTH_FOR_GENERATE like the v1 study pack route.
pub async fn generate_study_pack_legacy(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<StudyPackResponse>, ApiError> {
    let request = require_body(body)?;
    validate_notes_text(&request.text).map_err(ApiError::unprocessable)?;
    authenticate(&state.auth, &headers)?;

    log_api_start!("generate_study_pack_legacy", notes_length = request.text.len());

    match state.study_service.generate_study_pack(&request.text).await {
        Ok(pack) => {
            log_api_success!(
                "generate_study_pack_legacy",
                count = pack.quiz.len(),
                "study pack generated"
            );
            Ok(Json(pack))
        }
        Err(e) => {
            let detail = match &e {
                GenerationError::ModelUnavailable => {
                    "No response from the AI service. Check that GEMINI_API_KEY is set."
                        .to_string()
                }
                other => format!("Failed to generate study pack: {}", other),
            };
            log_api_error!(
                "generate_study_pack_legacy",
                error = &e,
                "generation pipeline failed"
            );
            Err(ApiError::internal(detail))
        }
    }
}

pub async fn generate_v1(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<StudyPackResponse>, ApiError> {
    let request = require_body(body)?;
    validate_notes_text(&request.text).map_err(ApiError::unprocessable)?;
    authenticate(&state.auth, &headers)?;

    log_api_start!("generate_study_pack", notes_length = request.text.len());

    let pack = state
        .study_service
        .generate_study_pack(&request.text)
        .await
        .map_err(|e| {
            generation_failure("generate_study_pack", "Failed to generate study materials", e)
        })?;

    log_api_success!(
        "generate_study_pack",
        count = pack.quiz.len(),
        "study pack generated"
    );
    Ok(Json(pack))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<TopicQuizResponse>, ApiError> {
    let request = require_body(body)?;
    validate_notes_text(&request.text).map_err(ApiError::unprocessable)?;
    authenticate(&state.auth.optional(), &headers)?;

    log_api_start!("generate_quiz", notes_length = request.text.len());

    let quiz = state
        .study_service
        .generate_topic_quiz(&request.text)
        .await
        .map_err(|e| generation_failure("generate_quiz", "Failed to generate quiz", e))?;

    log_api_success!("generate_quiz", count = quiz.len(), "quiz generated");
    Ok(Json(TopicQuizResponse { quiz }))
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FlashcardRequest>, JsonRejection>,
) -> Result<Json<FlashcardResponse>, ApiError> {
    let request = require_body(body)?;
    let source = request.validate().map_err(ApiError::unprocessable)?;
    let user = authenticate(&state.auth.optional(), &headers)?;
    let owner = owner_id(user.as_ref());

    log_api_start!("generate_flashcards", owner_id = &owner);

    let cards = state
        .study_service
        .generate_flashcards(
            source.text.as_deref(),
            source.topic.as_deref(),
            &request.difficulty.to_string(),
        )
        .await
        .map_err(|e| {
            generation_failure("generate_flashcards", "Failed to generate flashcards", e)
        })?;

    let record = FlashcardSetRecord::new(owner, &source, request.difficulty, cards);

    if let Err(e) = state.store.insert_set(&record).await {
        log_api_error!("generate_flashcards", error = &e, "flashcard set insert failed");
        return Err(ApiError::internal("Failed to store flashcards"));
    }

    log_api_success!(
        "generate_flashcards",
        set_id = record.id,
        "flashcard set stored"
    );

    Ok(Json(FlashcardResponse {
        flashcards: record.cards,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/generate-study-pack", post(generate_study_pack_legacy))
        .route("/api/v1/generate", post(generate_v1))
        .route("/api/v1/quiz", post(generate_quiz))
        .route("/api/v1/flashcards", post(generate_flashcards))
        .with_state(state)
}
