//! Generation session lifecycle
//!
//! A session is the durable audit record of one generation run: what was
//! requested, every per-candidate verdict, and the terminal status. The state
//! machine is `Pending -> Running -> {Completed, PartiallyCompleted, Failed}`;
//! terminal states admit no transitions and `finalize` runs exactly once.
//! Contract violations (recording after finalize, double finalize) are
//! reported as errors, never silently ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CandidateOutcome, SessionStatus, Verdict};
use ankigen_common::{Error, Result};

/// Audit record of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSession {
    pub session_id: Uuid,
    pub deck_id: Uuid,
    /// Context string the caller supplied to seed generation
    pub context: String,
    /// Number of cards the caller asked for
    pub requested_count: u32,
    pub status: SessionStatus,
    /// Per-candidate outcomes in original candidate order
    pub outcomes: Vec<CandidateOutcome>,
    pub accepted_count: u32,
    pub rejected_count: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationSession {
    /// Create a session in `Pending`, before the external generation call
    pub fn new(deck_id: Uuid, context: String, requested_count: u32) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            deck_id,
            context,
            requested_count,
            status: SessionStatus::Pending,
            outcomes: Vec::new(),
            accepted_count: 0,
            rejected_count: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Transition `Pending -> Running` when the external call is issued
    pub fn start(&mut self) -> Result<()> {
        if self.status != SessionStatus::Pending {
            return Err(Error::Internal(format!(
                "cannot start session {} from status {:?}",
                self.session_id, self.status
            )));
        }
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// Append an outcome and update running counts; valid only while Running
    pub fn record_outcome(
        &mut self,
        word: impl Into<String>,
        verdict: Verdict,
        detail: Option<String>,
    ) -> Result<()> {
        if self.status != SessionStatus::Running {
            return Err(Error::Internal(format!(
                "cannot record outcome on session {} in status {:?}",
                self.session_id, self.status
            )));
        }

        if verdict.is_accepted() {
            self.accepted_count += 1;
        } else {
            self.rejected_count += 1;
        }
        self.outcomes.push(CandidateOutcome { word: word.into(), verdict, detail });
        Ok(())
    }

    /// Compute the terminal status and stamp the completion time
    ///
    /// Completed: at least one accept and nothing rejected or failed.
    /// PartiallyCompleted: at least one accept alongside rejections.
    /// Failed: zero accepts.
    pub fn finalize(&mut self) -> Result<SessionStatus> {
        if self.status != SessionStatus::Running {
            return Err(Error::Internal(format!(
                "cannot finalize session {} in status {:?}",
                self.session_id, self.status
            )));
        }

        self.status = if self.accepted_count == 0 {
            SessionStatus::Failed
        } else if self.rejected_count > 0 {
            SessionStatus::PartiallyCompleted
        } else {
            SessionStatus::Completed
        };
        self.completed_at = Some(Utc::now());

        Ok(self.status)
    }

    /// Force the session into `Failed` with a single explanatory outcome,
    /// used when an infrastructure failure invalidates the whole run
    pub fn fail(&mut self, verdict: Verdict, detail: String) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::Internal(format!(
                "cannot fail session {} in terminal status {:?}",
                self.session_id, self.status
            )));
        }

        self.status = SessionStatus::Failed;
        self.rejected_count += 1;
        self.outcomes.push(CandidateOutcome {
            word: String::new(),
            verdict,
            detail: Some(detail),
        });
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Overwrite every recorded outcome with a generic infrastructure-failure
    /// detail, used when the batch write fails after filtering: a storage
    /// failure invalidates the whole batch's durability, not just one item
    pub fn fail_all(&mut self, detail: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::Internal(format!(
                "cannot fail session {} in terminal status {:?}",
                self.session_id, self.status
            )));
        }

        for outcome in &mut self.outcomes {
            outcome.verdict = Verdict::RejectedGenerationFailure;
            outcome.detail = Some(detail.to_string());
        }
        self.rejected_count += self.accepted_count;
        self.accepted_count = 0;
        self.status = SessionStatus::Failed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
