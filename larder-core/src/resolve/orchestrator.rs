//! The batch resolution loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingredient_parser::parse_ingredient;
use crate::matcher::{clean_name, match_ingredient};
use crate::resolve::store::{ResolutionStore, StoreError};
use crate::types::{CanonicalIngredient, IngredientDetail, MatchType, RawIngredientLine};
use crate::vocab::Vocabulary;

/// Knobs for one resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Recipes per batch before the pacing delay kicks in.
    pub batch_size: usize,
    /// Sleep between batches, bounding load on the shared datastore.
    pub pace: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            batch_size: 8,
            pace: Duration::from_millis(1500),
        }
    }
}

/// What happened to one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOutcome {
    Resolved { matched: usize, unmatched: usize },
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResolution {
    pub recipe_id: Uuid,
    pub outcome: RecipeOutcome,
}

/// Aggregate counters for a resolution run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Ingredient lines resolved to a dictionary entry.
    pub matched: usize,
    /// Ingredient lines with no acceptable match.
    pub unmatched: usize,
    pub cancelled: bool,
    /// Original texts of every unmatched line, for dictionary curation.
    pub unmatched_texts: Vec<String>,
    pub recipe_results: Vec<RecipeResolution>,
}

/// Resolve a collection of recipes.
///
/// Each recipe is independent: a failure is counted and the batch moves
/// on. Re-running with unchanged raw lines produces an identical detail
/// set - the per-recipe replacement makes the whole operation idempotent.
/// The cancellation flag is checked between recipes only, so at most one
/// recipe is in flight when a run stops.
pub async fn resolve_recipes(
    store: &mut dyn ResolutionStore,
    recipe_ids: &[Uuid],
    vocab: &Vocabulary,
    opts: &ResolveOptions,
    cancel: &AtomicBool,
) -> Result<ResolutionReport, StoreError> {
    let mut dictionary = store.load_dictionary()?;
    // Ascending id fixes the scan order, which fixes tie-breaks.
    dictionary.sort_by_key(|entry| entry.ingredient_id);
    let by_id: HashMap<i32, usize> = dictionary
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.ingredient_id, index))
        .collect();

    let mut report = ResolutionReport::default();

    for (processed, &recipe_id) in recipe_ids.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(processed, "Cancellation requested, stopping batch");
            report.cancelled = true;
            break;
        }

        if processed > 0 && processed % opts.batch_size == 0 && !opts.pace.is_zero() {
            tokio::time::sleep(opts.pace).await;
        }

        let outcome = resolve_one(store, recipe_id, &dictionary, &by_id, vocab, &mut report);
        match &outcome {
            RecipeOutcome::Resolved { matched, unmatched } => {
                report.success += 1;
                report.matched += matched;
                report.unmatched += unmatched;
                tracing::info!(%recipe_id, matched, unmatched, "Resolved recipe");
            }
            RecipeOutcome::Skipped => {
                report.skipped += 1;
                tracing::debug!(%recipe_id, "No raw ingredient lines, skipping");
            }
            RecipeOutcome::Failed { error } => {
                report.failed += 1;
                tracing::warn!(%recipe_id, error = %error, "Recipe resolution failed");
            }
        }
        report.recipe_results.push(RecipeResolution {
            recipe_id,
            outcome,
        });
    }

    Ok(report)
}

fn resolve_one(
    store: &mut dyn ResolutionStore,
    recipe_id: Uuid,
    dictionary: &[CanonicalIngredient],
    by_id: &HashMap<i32, usize>,
    vocab: &Vocabulary,
    report: &mut ResolutionReport,
) -> RecipeOutcome {
    let lines = match store.raw_lines(recipe_id) {
        Ok(lines) => lines,
        Err(e) => {
            return RecipeOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    if lines.is_empty() {
        return RecipeOutcome::Skipped;
    }

    let mut rows = Vec::with_capacity(lines.len());
    let mut matched = 0;
    let mut unmatched = 0;
    let mut misses = Vec::new();

    for line in &lines {
        let row = resolve_line(line, dictionary, by_id, vocab);
        if row.ingredient_id.is_some() {
            matched += 1;
        } else {
            unmatched += 1;
            misses.push(line.raw_text.clone());
        }
        rows.push(row);
    }

    match store.replace_details(recipe_id, &rows) {
        Ok(()) => {
            report.unmatched_texts.extend(misses);
            RecipeOutcome::Resolved { matched, unmatched }
        }
        Err(e) => RecipeOutcome::Failed {
            error: e.to_string(),
        },
    }
}

/// Resolve one raw line to a detail row. A line carrying a pre-resolved
/// canonical id bypasses fuzzy matching entirely.
fn resolve_line(
    line: &RawIngredientLine,
    dictionary: &[CanonicalIngredient],
    by_id: &HashMap<i32, usize>,
    vocab: &Vocabulary,
) -> IngredientDetail {
    if let Some(known_id) = line.known_ingredient_id {
        if let Some(&index) = by_id.get(&known_id) {
            let entry = &dictionary[index];
            return IngredientDetail {
                source_line_id: Some(line.line_id),
                ingredient_id: Some(entry.ingredient_id),
                original_text: line.raw_text.clone(),
                matched_term: Some(entry.name.clone()),
                match_type: Some(MatchType::Exact),
            };
        }
        tracing::warn!(
            known_id,
            line_id = %line.line_id,
            "Pre-resolved ingredient id not in dictionary, falling back to matching"
        );
    }

    let parsed = parse_ingredient(&line.raw_text, vocab);
    let cleaned = clean_name(&parsed.name, vocab);

    match match_ingredient(&cleaned, dictionary) {
        Some(result) => IngredientDetail {
            source_line_id: Some(line.line_id),
            ingredient_id: Some(result.ingredient_id),
            original_text: line.raw_text.clone(),
            matched_term: Some(result.matched_term),
            match_type: Some(result.match_type),
        },
        None => IngredientDetail {
            source_line_id: Some(line.line_id),
            ingredient_id: None,
            original_text: line.raw_text.clone(),
            matched_term: None,
            match_type: None,
        },
    }
}
