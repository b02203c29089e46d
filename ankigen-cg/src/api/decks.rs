//! Deck API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Card, Deck};
use crate::AppState;

/// POST /decks request
#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn deck_routes() -> Router<AppState> {
    Router::new()
        .route("/decks", post(create_deck).get(list_decks))
        .route("/decks/:deck_id", get(get_deck))
        .route("/decks/:deck_id/cards", get(list_deck_cards))
}

/// POST /decks — create a deck on explicit user request
pub async fn create_deck(
    State(state): State<AppState>,
    Json(request): Json<CreateDeckRequest>,
) -> ApiResult<Json<Deck>> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    let deck = Deck::new(
        title.to_string(),
        request.description.filter(|d| !d.trim().is_empty()),
    );
    state.decks.insert(&deck).await?;

    tracing::info!(deck_id = %deck.deck_id, title = %deck.title, "Deck created");
    Ok(Json(deck))
}

/// GET /decks
pub async fn list_decks(State(state): State<AppState>) -> ApiResult<Json<Vec<Deck>>> {
    Ok(Json(state.decks.list().await?))
}

/// GET /decks/:deck_id
pub async fn get_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> ApiResult<Json<Deck>> {
    let deck = state
        .decks
        .get(deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {}", deck_id)))?;
    Ok(Json(deck))
}

/// GET /decks/:deck_id/cards
pub async fn list_deck_cards(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Card>>> {
    if state.decks.get(deck_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Deck {}", deck_id)));
    }
    Ok(Json(state.cards.list_by_deck(deck_id).await?))
}
