//! Card database operations

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::decks::parse_timestamp;
use super::CardStore;
use crate::models::Card;
use ankigen_common::{Error, Result};

/// SQLite-backed card store
#[derive(Clone)]
pub struct SqliteCardStore {
    pool: SqlitePool,
}

impl SqliteCardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn card_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Card> {
    let card_id: String = row.get("card_id");
    let deck_id: String = row.get("deck_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Card {
        card_id: Uuid::parse_str(&card_id)
            .map_err(|e| Error::Internal(format!("Invalid card_id in storage: {}", e)))?,
        deck_id: Uuid::parse_str(&deck_id)
            .map_err(|e| Error::Internal(format!("Invalid deck_id in storage: {}", e)))?,
        word: row.get("word"),
        word_key: row.get("word_key"),
        translation: row.get("translation"),
        example: row.get("example"),
        example_translation: row.get("example_translation"),
        audio_ref: row.get("audio_ref"),
        context: row.get("context"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn insert_batch(&self, deck_id: Uuid, cards: &[Card]) -> Result<()> {
        if cards.is_empty() {
            return Ok(());
        }

        // All-or-nothing: the cards and the deck counter commit together, so
        // the counter can never diverge from the stored cards
        let mut tx = self.pool.begin().await?;

        for card in cards {
            sqlx::query(
                "INSERT INTO cards (card_id, deck_id, word, word_key, translation, example, \
                 example_translation, audio_ref, context, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(card.card_id.to_string())
            .bind(card.deck_id.to_string())
            .bind(&card.word)
            .bind(&card.word_key)
            .bind(&card.translation)
            .bind(&card.example)
            .bind(&card.example_translation)
            .bind(&card.audio_ref)
            .bind(&card.context)
            .bind(card.created_at.to_rfc3339())
            .bind(card.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(
            "UPDATE decks SET card_count = card_count + ?, updated_at = ? WHERE deck_id = ?",
        )
        .bind(cards.len() as i64)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(deck_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Deck {}", deck_id)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_deck(&self, deck_id: Uuid) -> Result<Vec<Card>> {
        let rows = sqlx::query(
            "SELECT card_id, deck_id, word, word_key, translation, example, \
             example_translation, audio_ref, context, created_at, updated_at \
             FROM cards WHERE deck_id = ? ORDER BY created_at, card_id",
        )
        .bind(deck_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(card_from_row).collect()
    }

    async fn attach_audio(&self, card_id: Uuid, audio_ref: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE cards SET audio_ref = ?, updated_at = ? WHERE card_id = ?",
        )
        .bind(audio_ref)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(card_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Card {}", card_id)));
        }

        Ok(())
    }
}
