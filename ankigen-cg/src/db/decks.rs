//! Deck database operations

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

use super::DeckStore;
use crate::models::Deck;
use ankigen_common::{Error, Result};

/// SQLite-backed deck store
#[derive(Clone)]
pub struct SqliteDeckStore {
    pool: SqlitePool,
}

impl SqliteDeckStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn deck_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Deck> {
    let deck_id: String = row.get("deck_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Deck {
        deck_id: Uuid::parse_str(&deck_id)
            .map_err(|e| Error::Internal(format!("Invalid deck_id in storage: {}", e)))?,
        title: row.get("title"),
        description: row.get("description"),
        card_count: row.get("card_count"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub(crate) fn parse_timestamp(value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in storage: {}", e)))
}

#[async_trait]
impl DeckStore for SqliteDeckStore {
    async fn get(&self, deck_id: Uuid) -> Result<Option<Deck>> {
        let row = sqlx::query(
            "SELECT deck_id, title, description, card_count, created_at, updated_at \
             FROM decks WHERE deck_id = ?",
        )
        .bind(deck_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(deck_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Deck>> {
        let rows = sqlx::query(
            "SELECT deck_id, title, description, card_count, created_at, updated_at \
             FROM decks ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(deck_from_row).collect()
    }

    async fn insert(&self, deck: &Deck) -> Result<()> {
        sqlx::query(
            "INSERT INTO decks (deck_id, title, description, card_count, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(deck.deck_id.to_string())
        .bind(&deck.title)
        .bind(&deck.description)
        .bind(deck.card_count)
        .bind(deck.created_at.to_rfc3339())
        .bind(deck.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_word_keys(&self, deck_id: Uuid) -> Result<HashSet<String>> {
        let keys: Vec<String> =
            sqlx::query_scalar("SELECT word_key FROM cards WHERE deck_id = ?")
                .bind(deck_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        Ok(keys.into_iter().collect())
    }
}
