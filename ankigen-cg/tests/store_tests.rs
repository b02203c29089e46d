//! SQLite store tests against a real (temporary) database file

use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use ankigen_cg::db::{
    CardStore, DeckStore, SessionStore, SqliteCardStore, SqliteDeckStore, SqliteSessionStore,
};
use ankigen_cg::models::{Card, CardCandidate, Deck, SessionStatus, Verdict};
use ankigen_cg::services::session::GenerationSession;
use ankigen_common::db::init_database_pool;
use ankigen_common::Error;

struct Harness {
    // Keeps the temp directory (and the db file in it) alive for the test
    _dir: TempDir,
    decks: SqliteDeckStore,
    cards: SqliteCardStore,
    sessions: SqliteSessionStore,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let pool = init_database_pool(&dir.path().join("test.db")).await.unwrap();
    Harness {
        _dir: dir,
        decks: SqliteDeckStore::new(pool.clone()),
        cards: SqliteCardStore::new(pool.clone()),
        sessions: SqliteSessionStore::new(pool),
    }
}

fn card(deck_id: Uuid, word: &str) -> Card {
    let candidate = CardCandidate {
        word: word.to_string(),
        translation: format!("{}-pt", word),
        example: format!("A sentence using {} in context.", word),
        example_translation: format!("Uma frase usando {}.", word),
    };
    Card::from_candidate(deck_id, &candidate, word.to_lowercase(), "travel", None)
}

async fn insert_deck(h: &Harness, title: &str) -> Deck {
    let deck = Deck::new(title.to_string(), Some("test deck".to_string()));
    h.decks.insert(&deck).await.unwrap();
    deck
}

#[tokio::test]
async fn deck_round_trip_and_listing() {
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;

    let loaded = h.decks.get(deck.deck_id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Travel");
    assert_eq!(loaded.description.as_deref(), Some("test deck"));
    assert_eq!(loaded.card_count, 0);

    insert_deck(&h, "Business").await;
    assert_eq!(h.decks.list().await.unwrap().len(), 2);

    assert!(h.decks.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn card_batch_round_trip_and_key_listing() {
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;

    let batch = vec![card(deck.deck_id, "hotel"), card(deck.deck_id, "airport")];
    h.cards.insert_batch(deck.deck_id, &batch).await.unwrap();

    let listed = h.cards.list_by_deck(deck.deck_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.audio_ref.is_none()));
    assert!(listed.iter().all(|c| c.context == "travel"));

    let keys = h.decks.list_word_keys(deck.deck_id).await.unwrap();
    assert!(keys.contains("hotel"));
    assert!(keys.contains("airport"));
    assert_eq!(keys.len(), 2);

    // Keys are scoped per deck
    let other = insert_deck(&h, "Business").await;
    assert!(h.decks.list_word_keys(other.deck_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_word_key_rolls_back_whole_batch() {
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;

    h.cards.insert_batch(deck.deck_id, &[card(deck.deck_id, "hotel")]).await.unwrap();

    // Second batch: one fresh word, one violating UNIQUE(deck_id, word_key).
    // The fresh word must not survive the failed transaction.
    let batch = vec![card(deck.deck_id, "airport"), card(deck.deck_id, "hotel")];
    let err = h.cards.insert_batch(deck.deck_id, &batch).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    let listed = h.cards.list_by_deck(deck.deck_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].word_key, "hotel");

    // The counter rolled back with the cards
    let loaded = h.decks.get(deck.deck_id).await.unwrap().unwrap();
    assert_eq!(loaded.card_count, 1);
}

#[tokio::test]
async fn same_word_key_allowed_across_decks() {
    let h = harness().await;
    let travel = insert_deck(&h, "Travel").await;
    let business = insert_deck(&h, "Business").await;

    h.cards.insert_batch(travel.deck_id, &[card(travel.deck_id, "hotel")]).await.unwrap();
    h.cards.insert_batch(business.deck_id, &[card(business.deck_id, "hotel")]).await.unwrap();

    assert_eq!(h.cards.list_by_deck(travel.deck_id).await.unwrap().len(), 1);
    assert_eq!(h.cards.list_by_deck(business.deck_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn batch_insert_bumps_deck_counter_atomically() {
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;

    let first = vec![card(deck.deck_id, "hotel"), card(deck.deck_id, "airport")];
    h.cards.insert_batch(deck.deck_id, &first).await.unwrap();
    h.cards.insert_batch(deck.deck_id, &[card(deck.deck_id, "luggage")]).await.unwrap();

    let loaded = h.decks.get(deck.deck_id).await.unwrap().unwrap();
    assert_eq!(loaded.card_count, 3);
    assert!(loaded.updated_at >= deck.updated_at);

    // Empty batch is a no-op for the counter too
    h.cards.insert_batch(deck.deck_id, &[]).await.unwrap();
    let loaded = h.decks.get(deck.deck_id).await.unwrap().unwrap();
    assert_eq!(loaded.card_count, 3);

    // Unknown deck: nothing commits, not even the cards
    let ghost = Uuid::new_v4();
    let err = h.cards.insert_batch(ghost, &[card(ghost, "hotel")]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(h.cards.list_by_deck(ghost).await.unwrap().is_empty());
}

#[tokio::test]
async fn attach_audio_sets_reference() {
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;
    let new_card = card(deck.deck_id, "hotel");
    h.cards
        .insert_batch(deck.deck_id, std::slice::from_ref(&new_card))
        .await
        .unwrap();

    h.cards
        .attach_audio(new_card.card_id, "audio/hotel-a1b2c3d4.mp3")
        .await
        .unwrap();

    let listed = h.cards.list_by_deck(deck.deck_id).await.unwrap();
    assert_eq!(listed[0].audio_ref.as_deref(), Some("audio/hotel-a1b2c3d4.mp3"));

    let err = h
        .cards
        .attach_audio(Uuid::new_v4(), "audio/missing.mp3")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn session_round_trip_preserves_outcomes_json() {
    let h = harness().await;
    let deck_id = Uuid::new_v4();

    let mut session = GenerationSession::new(deck_id, "travel phrases".to_string(), 5);
    h.sessions.insert(&session).await.unwrap();

    let loaded = h.sessions.get(session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::Pending);
    assert_eq!(loaded.requested_count, 5);
    assert_eq!(loaded.context, "travel phrases");
    assert!(loaded.outcomes.is_empty());
    assert!(loaded.completed_at.is_none());

    // Drive the state machine forward and persist the final record
    session.start().unwrap();
    session
        .record_outcome("hotel", Verdict::RejectedDuplicate, Some("already in deck".to_string()))
        .unwrap();
    session.record_outcome("airport", Verdict::Accepted, None).unwrap();
    session.finalize().unwrap();
    h.sessions.update(&session).await.unwrap();

    let loaded = h.sessions.get(session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::PartiallyCompleted);
    assert_eq!(loaded.accepted_count, 1);
    assert_eq!(loaded.rejected_count, 1);
    assert!(loaded.completed_at.is_some());

    assert_eq!(loaded.outcomes.len(), 2);
    assert_eq!(loaded.outcomes[0].word, "hotel");
    assert_eq!(loaded.outcomes[0].verdict, Verdict::RejectedDuplicate);
    assert_eq!(loaded.outcomes[0].detail.as_deref(), Some("already in deck"));
    assert_eq!(loaded.outcomes[1].verdict, Verdict::Accepted);
    assert!(loaded.outcomes[1].detail.is_none());
}

#[tokio::test]
async fn every_status_survives_storage() {
    let h = harness().await;

    for status in [
        SessionStatus::Pending,
        SessionStatus::Running,
        SessionStatus::Completed,
        SessionStatus::PartiallyCompleted,
        SessionStatus::Failed,
    ] {
        let mut session = GenerationSession::new(Uuid::new_v4(), "x".to_string(), 1);
        session.status = status;
        h.sessions.insert(&session).await.unwrap();

        let loaded = h.sessions.get(session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, status);
    }
}

#[tokio::test]
async fn updating_missing_session_is_not_found() {
    let h = harness().await;
    let session = GenerationSession::new(Uuid::new_v4(), "x".to_string(), 1);

    let err = h.sessions.update(&session).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(h.sessions.get(session.session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn stores_share_one_pool_behind_trait_objects() {
    // The orchestrator holds these as trait objects; make sure coercion and
    // shared-pool usage work end to end
    let h = harness().await;
    let deck = insert_deck(&h, "Travel").await;

    let decks: Arc<dyn DeckStore> = Arc::new(h.decks.clone());
    let cards: Arc<dyn CardStore> = Arc::new(h.cards.clone());
    let sessions: Arc<dyn SessionStore> = Arc::new(h.sessions.clone());

    cards.insert_batch(deck.deck_id, &[card(deck.deck_id, "hotel")]).await.unwrap();

    let session = GenerationSession::new(deck.deck_id, "travel".to_string(), 1);
    sessions.insert(&session).await.unwrap();

    assert_eq!(decks.get(deck.deck_id).await.unwrap().unwrap().card_count, 1);
    assert_eq!(cards.list_by_deck(deck.deck_id).await.unwrap().len(), 1);
    assert!(sessions.get(session.session_id).await.unwrap().is_some());
}
