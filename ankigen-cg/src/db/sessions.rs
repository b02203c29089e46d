//! Generation session database operations
//!
//! Outcomes are stored as a JSON column: the session is an audit record kept
//! by value, never joined against cards.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::decks::parse_timestamp;
use super::SessionStore;
use crate::models::{CandidateOutcome, SessionStatus};
use crate::services::session::GenerationSession;
use ankigen_common::{Error, Result};

/// SQLite-backed session store
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn status_to_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Pending => "pending",
        SessionStatus::Running => "running",
        SessionStatus::Completed => "completed",
        SessionStatus::PartiallyCompleted => "partially_completed",
        SessionStatus::Failed => "failed",
    }
}

fn status_from_str(value: &str) -> Result<SessionStatus> {
    match value {
        "pending" => Ok(SessionStatus::Pending),
        "running" => Ok(SessionStatus::Running),
        "completed" => Ok(SessionStatus::Completed),
        "partially_completed" => Ok(SessionStatus::PartiallyCompleted),
        "failed" => Ok(SessionStatus::Failed),
        other => Err(Error::Internal(format!("Unknown session status in storage: {}", other))),
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<GenerationSession> {
    let session_id: String = row.get("session_id");
    let deck_id: String = row.get("deck_id");
    let status: String = row.get("status");
    let outcomes: String = row.get("outcomes");
    let requested_count: i64 = row.get("requested_count");
    let accepted_count: i64 = row.get("accepted_count");
    let rejected_count: i64 = row.get("rejected_count");
    let created_at: String = row.get("created_at");
    let completed_at: Option<String> = row.get("completed_at");

    let outcomes: Vec<CandidateOutcome> = serde_json::from_str(&outcomes)
        .map_err(|e| Error::Internal(format!("Failed to deserialize outcomes: {}", e)))?;

    Ok(GenerationSession {
        session_id: Uuid::parse_str(&session_id)
            .map_err(|e| Error::Internal(format!("Invalid session_id in storage: {}", e)))?,
        deck_id: Uuid::parse_str(&deck_id)
            .map_err(|e| Error::Internal(format!("Invalid deck_id in storage: {}", e)))?,
        context: row.get("context"),
        requested_count: requested_count as u32,
        status: status_from_str(&status)?,
        outcomes,
        accepted_count: accepted_count as u32,
        rejected_count: rejected_count as u32,
        created_at: parse_timestamp(&created_at)?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, session: &GenerationSession) -> Result<()> {
        let outcomes = serde_json::to_string(&session.outcomes)
            .map_err(|e| Error::Internal(format!("Failed to serialize outcomes: {}", e)))?;

        sqlx::query(
            "INSERT INTO generation_sessions (session_id, deck_id, context, requested_count, \
             status, outcomes, accepted_count, rejected_count, created_at, completed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session.session_id.to_string())
        .bind(session.deck_id.to_string())
        .bind(&session.context)
        .bind(session.requested_count as i64)
        .bind(status_to_str(session.status))
        .bind(&outcomes)
        .bind(session.accepted_count as i64)
        .bind(session.rejected_count as i64)
        .bind(session.created_at.to_rfc3339())
        .bind(session.completed_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, session: &GenerationSession) -> Result<()> {
        let outcomes = serde_json::to_string(&session.outcomes)
            .map_err(|e| Error::Internal(format!("Failed to serialize outcomes: {}", e)))?;

        let result = sqlx::query(
            "UPDATE generation_sessions SET status = ?, outcomes = ?, accepted_count = ?, \
             rejected_count = ?, completed_at = ? WHERE session_id = ?",
        )
        .bind(status_to_str(session.status))
        .bind(&outcomes)
        .bind(session.accepted_count as i64)
        .bind(session.rejected_count as i64)
        .bind(session.completed_at.map(|dt| dt.to_rfc3339()))
        .bind(session.session_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Session {}", session.session_id)));
        }

        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<GenerationSession>> {
        let row = sqlx::query(
            "SELECT session_id, deck_id, context, requested_count, status, outcomes, \
             accepted_count, rejected_count, created_at, completed_at \
             FROM generation_sessions WHERE session_id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }
}
