//! Card generation orchestrator
//!
//! Coordinates one generation run end to end: deck lookup, existing-key read,
//! session lifecycle, the external generation call, the per-candidate filter
//! chain (normalize -> duplicate -> quality -> audio), and the all-or-nothing
//! batch commit (cards plus deck counter in one transaction).
//!
//! Duplicate and quality decisions are made strictly in candidate input order
//! (the in-run key set grows incrementally, so results are deterministic);
//! audio synthesis then runs through an order-preserving bounded worker pool
//! over the already-accepted candidates. Runs against the same deck are
//! serialized by a per-deck async mutex held from the key-set read through the
//! batch write.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::{CardStore, DeckStore, SessionStore};
use crate::models::{Card, CardCandidate, Verdict};
use crate::services::duplicate_detector::{check_duplicate, DuplicateMatch};
use crate::services::normalizer::normalize_word;
use crate::services::quality_gate;
use crate::services::session::GenerationSession;
use crate::services::tts_client::AudioSynthesisService;
use crate::services::word_generator::WordGenerationService;
use ankigen_common::config::Settings;
use ankigen_common::{Error, Result};

/// Per-candidate decision from the ordered filter phase
enum Decision {
    Rejected { verdict: Verdict, detail: Option<String> },
    Accepted { key: String },
}

/// Result of one audio synthesis attempt for an accepted candidate
enum AudioOutcome {
    Ref(String),
    Failed(String),
    Cancelled,
}

/// Top-level coordinator for card generation runs
pub struct CardGenerator {
    decks: Arc<dyn DeckStore>,
    cards: Arc<dyn CardStore>,
    sessions: Arc<dyn SessionStore>,
    word_gen: Arc<dyn WordGenerationService>,
    audio: Arc<dyn AudioSynthesisService>,
    settings: Settings,
    /// Serializes generation runs per deck so duplicate checks never race a
    /// stale key set
    deck_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CardGenerator {
    pub fn new(
        decks: Arc<dyn DeckStore>,
        cards: Arc<dyn CardStore>,
        sessions: Arc<dyn SessionStore>,
        word_gen: Arc<dyn WordGenerationService>,
        audio: Arc<dyn AudioSynthesisService>,
        settings: Settings,
    ) -> Self {
        Self {
            decks,
            cards,
            sessions,
            word_gen,
            audio,
            settings,
            deck_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn deck_lock(&self, deck_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.deck_locks.lock().await;
        // Entries held only by the map belong to finished runs
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(deck_id).or_default().clone()
    }

    /// Run one generation request; the returned session is the full report,
    /// including per-candidate verdicts
    ///
    /// Surfaced errors: deck not found, invalid request parameters, the
    /// generation-service call failing outright, or a storage failure. All
    /// per-candidate rejections are recorded as session outcomes instead.
    pub async fn generate(
        &self,
        deck_id: Uuid,
        context: &str,
        max_cards: u32,
        cancel: CancellationToken,
    ) -> Result<GenerationSession> {
        let context = context.trim();
        if context.is_empty() {
            return Err(Error::InvalidInput("context must not be empty".to_string()));
        }
        if max_cards == 0 || max_cards > self.settings.max_cards_limit {
            return Err(Error::InvalidInput(format!(
                "max_cards must be within 1..={}, got {}",
                self.settings.max_cards_limit, max_cards
            )));
        }

        // Fail fast before creating any session record
        self.decks
            .get(deck_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Deck {}", deck_id)))?;

        let lock = self.deck_lock(deck_id).await;
        let _guard = lock.lock().await;

        // One bounded read; grows incrementally during the run to catch
        // intra-run duplicates
        let mut existing_keys = self.decks.list_word_keys(deck_id).await?;

        let mut session = GenerationSession::new(deck_id, context.to_string(), max_cards);
        self.sessions.insert(&session).await?;
        session.start()?;
        self.sessions.update(&session).await?;

        tracing::info!(
            session_id = %session.session_id,
            deck_id = %deck_id,
            max_cards,
            "Generation session started"
        );

        if cancel.is_cancelled() {
            return self.finish_cancelled(session).await;
        }

        let candidates = match self.word_gen.generate(context, max_cards).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(
                    session_id = %session.session_id,
                    error = %e,
                    "Word generation call failed, aborting run"
                );
                session.fail(
                    Verdict::RejectedGenerationFailure,
                    format!("generation service failure: {}", e),
                )?;
                self.sessions.update(&session).await?;
                return Err(Error::Generation(e.to_string()));
            }
        };

        // Fewer candidates than requested is not an error; the shortfall shows
        // up as accepted count < requested count
        tracing::debug!(
            session_id = %session.session_id,
            returned = candidates.len(),
            "Filtering candidates"
        );

        // Ordered decision phase: duplicate and quality verdicts are fixed
        // here, before any audio work
        let mut decisions = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let decision = self.decide(candidate, &mut existing_keys);
            decisions.push(decision);
        }

        if cancel.is_cancelled() {
            return self.finish_cancelled(session).await;
        }

        // Bounded, order-preserving audio pool over the accepted candidates
        let accepted_indices: Vec<usize> = decisions
            .iter()
            .enumerate()
            .filter_map(|(i, d)| matches!(d, Decision::Accepted { .. }).then_some(i))
            .collect();

        let audio_results: Vec<AudioOutcome> = stream::iter(accepted_indices.iter().copied())
            .map(|i| {
                let word = candidates[i].word.clone();
                let audio = Arc::clone(&self.audio);
                let cancel = cancel.clone();
                async move {
                    tokio::select! {
                        _ = cancel.cancelled() => AudioOutcome::Cancelled,
                        result = audio.synthesize(&word) => match result {
                            Ok(audio_ref) => AudioOutcome::Ref(audio_ref),
                            Err(e) => AudioOutcome::Failed(e.to_string()),
                        },
                    }
                }
            })
            .buffered(self.settings.audio_workers.max(1))
            .collect()
            .await;

        if cancel.is_cancelled() {
            return self.finish_cancelled(session).await;
        }

        // Reassemble outcomes in original candidate order and build the batch
        let mut audio_by_index: HashMap<usize, AudioOutcome> =
            accepted_indices.into_iter().zip(audio_results).collect();

        let mut batch = Vec::new();
        for (i, (candidate, decision)) in candidates.iter().zip(decisions).enumerate() {
            match decision {
                Decision::Rejected { verdict, detail } => {
                    session.record_outcome(&candidate.word, verdict, detail)?;
                }
                Decision::Accepted { key } => {
                    let (audio_ref, detail) = match audio_by_index.remove(&i) {
                        Some(AudioOutcome::Ref(audio_ref)) => (Some(audio_ref), None),
                        Some(AudioOutcome::Failed(e)) => {
                            // Audio is an enhancement, not an acceptance
                            // blocker; pronunciation can be attached later
                            tracing::warn!(
                                session_id = %session.session_id,
                                word = %candidate.word,
                                error = %e,
                                "Audio synthesis failed, accepting card without audio"
                            );
                            (None, Some(format!("audio synthesis failed: {}", e)))
                        }
                        Some(AudioOutcome::Cancelled) | None => (None, None),
                    };

                    session.record_outcome(&candidate.word, Verdict::Accepted, detail)?;
                    batch.push(Card::from_candidate(deck_id, candidate, key, context, audio_ref));
                }
            }
        }

        // No partial writes: cards and the deck counter commit in one
        // transaction, only after all filtering completed
        if let Err(e) = self.cards.insert_batch(deck_id, &batch).await {
            tracing::error!(
                session_id = %session.session_id,
                error = %e,
                "Card batch write failed, failing whole run"
            );
            session.fail_all(&format!("card batch write failed: {}", e))?;
            self.sessions.update(&session).await?;
            return Err(e);
        }

        let status = session.finalize()?;
        self.sessions.update(&session).await?;

        tracing::info!(
            session_id = %session.session_id,
            status = ?status,
            accepted = session.accepted_count,
            rejected = session.rejected_count,
            "Generation session finalized"
        );

        Ok(session)
    }

    /// Normalize and run the duplicate and quality checks for one candidate,
    /// growing the key set on acceptance
    fn decide(
        &self,
        candidate: &CardCandidate,
        existing_keys: &mut std::collections::HashSet<String>,
    ) -> Decision {
        let key = normalize_word(&candidate.word);
        if key.is_empty() {
            return Decision::Rejected {
                verdict: Verdict::RejectedQuality,
                detail: Some("word is empty after normalization".to_string()),
            };
        }

        match check_duplicate(&key, existing_keys, self.settings.similarity_threshold) {
            DuplicateMatch::Exact(existing) => {
                return Decision::Rejected {
                    verdict: Verdict::RejectedDuplicate,
                    detail: Some(format!("already in deck as \"{}\"", existing)),
                };
            }
            DuplicateMatch::Similar { existing, score } => {
                return Decision::Rejected {
                    verdict: Verdict::RejectedDuplicate,
                    detail: Some(format!(
                        "too similar to \"{}\" (similarity {:.2})",
                        existing, score
                    )),
                };
            }
            DuplicateMatch::None => {}
        }

        let verdict = quality_gate::evaluate(candidate, &self.settings.quality);
        if !verdict.pass {
            return Decision::Rejected {
                verdict: Verdict::RejectedQuality,
                detail: verdict.reason,
            };
        }

        existing_keys.insert(key.clone());
        Decision::Accepted { key }
    }

    /// Finalize a cancelled run: in-flight work is abandoned and nothing is
    /// persisted except the failed session itself
    async fn finish_cancelled(&self, mut session: GenerationSession) -> Result<GenerationSession> {
        tracing::warn!(session_id = %session.session_id, "Generation run cancelled");
        session.fail(
            Verdict::RejectedGenerationFailure,
            "generation cancelled by caller".to_string(),
        )?;
        self.sessions.update(&session).await?;
        Ok(session)
    }
}
