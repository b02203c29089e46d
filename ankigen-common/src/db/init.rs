//! SQLite pool initialization and schema creation
//!
//! The schema is created idempotently on startup. The
//! `UNIQUE(deck_id, word_key)` index on `cards` is the storage-level backstop
//! for the one-word-per-deck invariant the duplicate detector enforces
//! upstream.

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Opens (or creates) the database file and creates missing tables.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create ankigen tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS decks (
            deck_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            card_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            card_id TEXT PRIMARY KEY,
            deck_id TEXT NOT NULL REFERENCES decks(deck_id),
            word TEXT NOT NULL,
            word_key TEXT NOT NULL,
            translation TEXT NOT NULL,
            example TEXT NOT NULL,
            example_translation TEXT NOT NULL,
            audio_ref TEXT,
            context TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(deck_id, word_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generation_sessions (
            session_id TEXT PRIMARY KEY,
            deck_id TEXT NOT NULL,
            context TEXT NOT NULL,
            requested_count INTEGER NOT NULL,
            status TEXT NOT NULL,
            outcomes TEXT NOT NULL,
            accepted_count INTEGER NOT NULL DEFAULT 0,
            rejected_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_deck ON generation_sessions(deck_id)")
        .execute(pool)
        .await?;

    Ok(())
}
