//! Canonical ingredient matching.
//!
//! Scores a cleaned ingredient name against the canonical dictionary with
//! deterministic string rules - no model, no index, a linear scan per call.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CanonicalIngredient, MatchResult, MatchType};
use crate::vocab::Vocabulary;

/// Minimum score a candidate must exceed to be accepted.
pub const ACCEPT_THRESHOLD: f64 = 0.3;

/// Scores at or above this boundary classify as `exact`, below as `alias`.
pub const EXACT_BOUNDARY: f64 = 0.95;

/// Parenthetical and bracketed asides, removed before tokenizing.
static ASIDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("Invalid aside regex"));

/// Reduce a raw ingredient phrase to the words that identify the
/// ingredient: lowercase, drop asides, quantity numerals, unit words, and
/// the stopword tables (prep verbs, state/size/cuisine adjectives,
/// fillers), collapse punctuation and whitespace.
pub fn clean_name(raw: &str, vocab: &Vocabulary) -> String {
    let lowered = raw.to_lowercase();
    let without_asides = ASIDE_REGEX.replace_all(&lowered, " ");

    without_asides
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|token| token.trim_matches(|c| c == '-' || c == '\''))
        .filter(|token| !token.is_empty())
        .filter(|token| !token.starts_with(|c: char| c.is_ascii_digit()))
        .filter(|token| !vocab.is_unit_word(token))
        .filter(|token| !vocab.is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score `cleaned` against every dictionary entry and return the best
/// candidate above [`ACCEPT_THRESHOLD`], or `None`.
///
/// The scan is order-dependent on ties (first exact match wins, and the
/// first of two equally-scored candidates is kept), so callers must pass
/// the dictionary sorted ascending by `ingredient_id` for deterministic
/// results.
pub fn match_ingredient(
    cleaned: &str,
    dictionary: &[CanonicalIngredient],
) -> Option<MatchResult> {
    let cleaned = cleaned.trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    let mut best: Option<(f64, &CanonicalIngredient)> = None;

    for entry in dictionary {
        let entry_name = entry.name.trim().to_lowercase();
        if entry_name.is_empty() {
            continue;
        }

        if cleaned == entry_name {
            return Some(MatchResult {
                ingredient_id: entry.ingredient_id,
                score: 1.0,
                match_type: MatchType::Exact,
                matched_term: entry.name.clone(),
            });
        }

        let score = if is_plural_of(&cleaned, &entry_name) || is_plural_of(&entry_name, &cleaned) {
            0.9
        } else if cleaned.contains(&entry_name) || entry_name.contains(&cleaned) {
            let a = cleaned.chars().count() as f64;
            let b = entry_name.chars().count() as f64;
            a.min(b) / a.max(b)
        } else {
            0.0
        };

        // Strictly-greater keeps the first (lowest id) candidate on ties.
        if score > best.map_or(0.0, |(s, _)| s) {
            best = Some((score, entry));
        }
    }

    let (score, entry) = best?;
    if score <= ACCEPT_THRESHOLD {
        return None;
    }

    Some(MatchResult {
        ingredient_id: entry.ingredient_id,
        score,
        match_type: if score >= EXACT_BOUNDARY {
            MatchType::Exact
        } else {
            MatchType::Alias
        },
        matched_term: entry.name.clone(),
    })
}

/// True when `plural` is `singular` with a trailing "s" or "es"
/// ("carrots"/"carrot", "tomatoes"/"tomato").
fn is_plural_of(plural: &str, singular: &str) -> bool {
    plural.strip_suffix('s').is_some_and(|stem| {
        stem == singular || stem.strip_suffix('e').is_some_and(|stem| stem == singular)
    })
}
