use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image payload extracted from an import record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeImage {
    /// Generated filename for the decoded bytes (e.g., `"<uuid>.jpg"`).
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The canonical in-memory recipe shape after field normalization.
///
/// Every scalar field defaults to `""` when the source record carries no
/// matching field - a missing field is never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecipe {
    pub title: String,
    pub description: String,
    pub cuisine: String,
    pub servings: String,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    /// One raw ingredient phrase per entry, in source order.
    pub ingredient_lines: Vec<String>,
    pub direction_lines: Vec<String>,
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RecipeImage>,
}

/// A persisted raw ingredient line, as stored against a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIngredientLine {
    pub recipe_id: Uuid,
    pub line_id: Uuid,
    /// Position within the recipe's ingredient list.
    pub position: i32,
    pub raw_text: String,
    pub amount: Option<String>,
    pub unit: Option<String>,
    /// Pre-resolved canonical id carried over from a structured re-import.
    /// When set, resolution writes an exact detail record without matching.
    pub known_ingredient_id: Option<i32>,
}

/// One entry of the canonical ingredient dictionary. Read-only reference
/// data owned externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIngredient {
    pub ingredient_id: i32,
    pub name: String,
    pub category_id: i32,
}

/// How a match was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Alias,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Alias => "alias",
        }
    }
}

/// A scored match of a cleaned ingredient name against the dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub ingredient_id: i32,
    /// Similarity in `[0, 1]`.
    pub score: f64,
    pub match_type: MatchType,
    /// The dictionary name the score was computed against.
    pub matched_term: String,
}

/// One row of a recipe's resolved detail set. Unmatched lines are kept
/// with `ingredient_id: None` so no ingredient is silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDetail {
    /// Back-reference to the raw line this row derives from, preserved so
    /// downstream consumers can join back to quantity/unit data.
    pub source_line_id: Option<Uuid>,
    pub ingredient_id: Option<i32>,
    pub original_text: String,
    pub matched_term: Option<String>,
    pub match_type: Option<MatchType>,
}
