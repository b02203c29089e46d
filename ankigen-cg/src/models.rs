//! Data records for decks, cards, and generation outcomes
//!
//! Plain serializable records; behavior lives in the services layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered collection of cards under one title
///
/// `card_count` is a running counter maintained on card acceptance, not
/// recomputed per read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub deck_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub card_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            deck_id: Uuid::new_v4(),
            title,
            description,
            card_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One flashcard
///
/// Immutable once accepted, except `audio_ref` which may be attached after
/// creation (audio synthesis can lag behind card acceptance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub card_id: Uuid,
    pub deck_id: Uuid,
    /// Original surface form of the target term
    pub word: String,
    /// Normalized comparison key for duplicate detection
    pub word_key: String,
    pub translation: String,
    pub example: String,
    pub example_translation: String,
    /// Relative path of the synthesized pronunciation clip, if any
    pub audio_ref: Option<String>,
    /// Context string that produced this card
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Build an accepted card from a generation candidate
    pub fn from_candidate(
        deck_id: Uuid,
        candidate: &CardCandidate,
        word_key: String,
        context: &str,
        audio_ref: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            card_id: Uuid::new_v4(),
            deck_id,
            word: candidate.word.trim().to_string(),
            word_key,
            translation: candidate.translation.trim().to_string(),
            example: candidate.example.trim().to_string(),
            example_translation: candidate.example_translation.trim().to_string(),
            audio_ref,
            context: context.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A word/translation/example tuple returned by the generation service,
/// not yet accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardCandidate {
    pub word: String,
    pub translation: String,
    pub example: String,
    pub example_translation: String,
}

/// Per-candidate outcome classification recorded in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    RejectedDuplicate,
    RejectedQuality,
    RejectedGenerationFailure,
    RejectedAudioFailure,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// One recorded candidate decision, stored by value in the session so the
/// audit trail survives later card edits or removals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOutcome {
    pub word: String,
    pub verdict: Verdict,
    /// Reason detail (duplicate match, quality reason, failure message)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Generation session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    PartiallyCompleted,
    Failed,
}

impl SessionStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::PartiallyCompleted | SessionStatus::Failed
        )
    }
}
