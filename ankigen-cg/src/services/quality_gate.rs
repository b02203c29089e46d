//! Quality gate for generated card candidates
//!
//! Hard checks (empty fields, word length bounds, example must use the word)
//! reject outright; everything else feeds a weighted composite score compared
//! against the configured threshold. Weights and thresholds come from
//! [`QualitySettings`], passed in explicitly.

use crate::models::CardCandidate;
use crate::services::normalizer::normalize_word;
use ankigen_common::config::QualitySettings;

/// Outcome of a quality evaluation
#[derive(Debug, Clone)]
pub struct QualityVerdict {
    pub pass: bool,
    /// Composite score in 0.0..=1.0 (0.0 when a hard check failed)
    pub score: f64,
    /// Rejection reason, present iff `pass` is false
    pub reason: Option<String>,
}

impl QualityVerdict {
    fn fail(reason: impl Into<String>) -> Self {
        Self { pass: false, score: 0.0, reason: Some(reason.into()) }
    }
}

/// Evaluate a candidate against the quality configuration
pub fn evaluate(candidate: &CardCandidate, config: &QualitySettings) -> QualityVerdict {
    let word_key = normalize_word(&candidate.word);
    let translation = candidate.translation.trim();
    let example = candidate.example.trim();
    let example_translation = candidate.example_translation.trim();

    if word_key.is_empty() {
        return QualityVerdict::fail("word is empty after normalization");
    }
    if translation.is_empty() {
        return QualityVerdict::fail("translation is empty");
    }
    if example.is_empty() {
        return QualityVerdict::fail("example sentence is empty");
    }
    if example_translation.is_empty() {
        return QualityVerdict::fail("example translation is empty");
    }

    let word_len = candidate.word.trim().chars().count();
    if word_len < config.min_word_len {
        return QualityVerdict::fail(format!(
            "word too short ({} < {} characters)",
            word_len, config.min_word_len
        ));
    }
    if word_len > config.max_word_len {
        return QualityVerdict::fail(format!(
            "word too long ({} > {} characters)",
            word_len, config.max_word_len
        ));
    }

    if !example_uses_word(&word_key, example) {
        return QualityVerdict::fail("example sentence does not use the target word");
    }

    let word_score = score_word(&candidate.word);
    let translation_score = score_translation(translation);
    let example_score = score_example(example, example_translation, config);

    let weight_sum = config.word_weight + config.translation_weight + config.example_weight;
    let score = if weight_sum > 0.0 {
        (word_score * config.word_weight
            + translation_score * config.translation_weight
            + example_score * config.example_weight)
            / weight_sum
    } else {
        0.0
    };

    if score < config.score_threshold {
        return QualityVerdict {
            pass: false,
            score,
            reason: Some(format!(
                "composite quality score {:.2} below threshold {:.2}",
                score, config.score_threshold
            )),
        };
    }

    QualityVerdict { pass: true, score, reason: None }
}

/// Heuristic check that the example sentence uses the target word in some
/// inflected form
///
/// Full-key substring match first; otherwise every key token of 3+ characters
/// must appear stemmed (trailing inflection characters dropped) somewhere in
/// the normalized example.
fn example_uses_word(word_key: &str, example: &str) -> bool {
    let example_norm = normalize_word(example);
    if example_norm.contains(word_key) {
        return true;
    }

    word_key
        .split_whitespace()
        .filter(|token| token.chars().count() >= 3)
        .all(|token| example_norm.contains(stem(token)))
}

/// Crude stemmer: drop up to 3 trailing characters, keeping at least 4
///
/// Enough to match "collaborate" in "collaborated", "refactor" in
/// "refactoring".
fn stem(token: &str) -> &str {
    let len = token.chars().count();
    if len <= 4 {
        return token;
    }
    let keep = (len - 3).max(4);
    match token.char_indices().nth(keep) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

fn score_word(word: &str) -> f64 {
    let word = word.trim();
    let mut score: f64 = 1.0;

    // Words should be letters plus the separators that occur inside terms
    if !word
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        score -= 0.4;
    }

    // Long phrases make poor flashcards
    if word.split_whitespace().count() > 5 {
        score -= 0.3;
    }

    score.clamp(0.0, 1.0)
}

fn score_translation(translation: &str) -> f64 {
    let mut score: f64 = 1.0;
    let len = translation.chars().count();

    if len < 2 {
        score -= 0.4;
    } else if len > 100 {
        score -= 0.2;
    }

    // Multiple listed translations add value
    if translation.contains(',') || translation.contains(';') {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

fn score_example(example: &str, example_translation: &str, config: &QualitySettings) -> f64 {
    let mut score: f64 = 1.0;
    let len = example.chars().count();

    if len < config.min_example_len {
        score -= 0.4;
    } else if len > 200 {
        score -= 0.2;
    }

    if example_translation.chars().count() < config.min_example_len {
        score -= 0.3;
    }

    // Filler openers signal a generic, low-value example
    let lower = example.to_lowercase();
    const GENERIC_OPENERS: [&str; 5] =
        ["this is a", "that is a", "it is a", "here is a", "there is a"];
    if GENERIC_OPENERS.iter().any(|g| lower.starts_with(g)) {
        score -= 0.3;
    }

    score.clamp(0.0, 1.0)
}
