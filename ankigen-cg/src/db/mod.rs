//! Persistence layer for the card generator
//!
//! Store traits are the orchestrator's narrow interface to storage; the
//! `Sqlite*Store` implementations back them with the shared pool. Tests swap
//! in mock implementations.

pub mod cards;
pub mod decks;
pub mod sessions;

pub use cards::SqliteCardStore;
pub use decks::SqliteDeckStore;
pub use sessions::SqliteSessionStore;

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Card, Deck};
use crate::services::session::GenerationSession;
use ankigen_common::Result;

/// Deck persistence operations
#[async_trait]
pub trait DeckStore: Send + Sync {
    async fn get(&self, deck_id: Uuid) -> Result<Option<Deck>>;
    async fn list(&self) -> Result<Vec<Deck>>;
    async fn insert(&self, deck: &Deck) -> Result<()>;
    /// One bounded read of all normalized word keys in a deck
    async fn list_word_keys(&self, deck_id: Uuid) -> Result<HashSet<String>>;
}

/// Card persistence operations
#[async_trait]
pub trait CardStore: Send + Sync {
    /// All-or-nothing batch insert: the cards and the deck's running card
    /// counter commit in a single transaction
    async fn insert_batch(&self, deck_id: Uuid, cards: &[Card]) -> Result<()>;
    async fn list_by_deck(&self, deck_id: Uuid) -> Result<Vec<Card>>;
    /// Attach a pronunciation clip after acceptance; the only permitted
    /// post-acceptance mutation
    async fn attach_audio(&self, card_id: Uuid, audio_ref: &str) -> Result<()>;
}

/// Generation session persistence operations
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &GenerationSession) -> Result<()>;
    async fn update(&self, session: &GenerationSession) -> Result<()>;
    async fn get(&self, session_id: Uuid) -> Result<Option<GenerationSession>>;
}
