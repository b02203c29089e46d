//! Generation API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::GenerationSession;
use crate::AppState;

/// POST /decks/:deck_id/generate request
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub context: String,
    /// Defaults to the configured per-generation card count
    #[serde(default)]
    pub max_cards: Option<u32>,
}

pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/decks/:deck_id/generate", post(generate_cards))
        .route("/sessions/:session_id", get(get_session))
}

/// POST /decks/:deck_id/generate
///
/// Runs the generation pipeline and returns the finalized session: callers
/// inspect its status and outcome list rather than a single error code for
/// partial results.
pub async fn generate_cards(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerationSession>> {
    let context = request.context.trim().to_string();
    if context.is_empty() {
        return Err(ApiError::BadRequest("context must not be empty".to_string()));
    }

    let max_cards = request.max_cards.unwrap_or(state.settings.default_max_cards);
    if max_cards == 0 || max_cards > state.settings.max_cards_limit {
        return Err(ApiError::BadRequest(format!(
            "max_cards must be within 1..={}",
            state.settings.max_cards_limit
        )));
    }

    // This handler future is dropped when the client disconnects; the run is
    // spawned so it still drives the session to a terminal status
    let generator = state.generator.clone();
    let run = tokio::spawn(async move {
        generator
            .generate(deck_id, &context, max_cards, CancellationToken::new())
            .await
    });

    let session = run
        .await
        .map_err(|e| ApiError::Internal(format!("generation task failed: {}", e)))??;

    Ok(Json(session))
}

/// GET /sessions/:session_id — audit retrieval of a past generation run
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<GenerationSession>> {
    let session = state
        .sessions
        .get(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {}", session_id)))?;
    Ok(Json(session))
}
