//! Duplicate detection against a deck's existing word keys
//!
//! Exact set membership first, then fuzzy matching with
//! `strsim::normalized_levenshtein`. A candidate whose best similarity score
//! reaches the threshold counts as a duplicate; ties at exactly the threshold
//! are duplicates (deck precision over vocabulary recall).
//!
//! The fuzzy pass is O(existing-set-size) per candidate, which is fine for
//! human study-deck sizes (low thousands).

use std::collections::HashSet;

/// Result of a duplicate check, carrying the matched key for outcome detail
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateMatch {
    /// Key already present verbatim
    Exact(String),
    /// Key within similarity threshold of an existing key
    Similar { existing: String, score: f64 },
    /// No duplicate found
    None,
}

impl DuplicateMatch {
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, DuplicateMatch::None)
    }
}

/// Check a normalized key against the deck's existing normalized keys
pub fn check_duplicate(
    key: &str,
    existing_keys: &HashSet<String>,
    similarity_threshold: f64,
) -> DuplicateMatch {
    if existing_keys.contains(key) {
        return DuplicateMatch::Exact(key.to_string());
    }

    let mut best: Option<(&str, f64)> = None;
    for existing in existing_keys {
        let score = strsim::normalized_levenshtein(key, existing);
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((existing, score));
        }
    }

    match best {
        Some((existing, score)) if score >= similarity_threshold => DuplicateMatch::Similar {
            existing: existing.to_string(),
            score,
        },
        _ => DuplicateMatch::None,
    }
}

/// Convenience boolean form of [`check_duplicate`]
pub fn is_duplicate(key: &str, existing_keys: &HashSet<String>, similarity_threshold: f64) -> bool {
    check_duplicate(key, existing_keys, similarity_threshold).is_duplicate()
}
