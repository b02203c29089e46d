//! ankigen-cg library interface
//!
//! Card Generator service: turns a free-text context into a deck of
//! vocabulary flashcards with translations, example sentences, and
//! synthesized pronunciation audio.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::{CardStore, DeckStore, SessionStore};
use crate::services::CardGenerator;
use ankigen_common::config::Settings;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub decks: Arc<dyn DeckStore>,
    pub cards: Arc<dyn CardStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub generator: Arc<CardGenerator>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        decks: Arc<dyn DeckStore>,
        cards: Arc<dyn CardStore>,
        sessions: Arc<dyn SessionStore>,
        generator: Arc<CardGenerator>,
    ) -> Self {
        Self {
            settings,
            decks,
            cards,
            sessions,
            generator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::deck_routes())
        .merge(api::generation_routes())
        .merge(api::health_routes())
        .with_state(state)
}
