//! Recipe field normalization.
//!
//! Maps one decoded raw object - whatever external field names it uses -
//! into [`NormalizedRecipe`]. Resolution per logical field is
//! first-match-wins across a fixed synonym list; a field with no matching
//! synonym stays at its empty value.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::types::{NormalizedRecipe, RecipeImage};

/// Field synonyms, in first-match-wins order. The names cover the export
/// shapes we ingest: recipe-manager archives (snake_case) and schema.org
/// markup (camelCase).
const TITLE_FIELDS: &[&str] = &["title", "name", "recipe_name"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "summary"];
const CUISINE_FIELDS: &[&str] = &["cuisine", "category"];
const SERVINGS_FIELDS: &[&str] = &["servings", "yield", "recipeYield"];
const PREP_TIME_FIELDS: &[&str] = &["prep_time", "prepTime"];
const COOK_TIME_FIELDS: &[&str] = &["cook_time", "cookTime"];
const TOTAL_TIME_FIELDS: &[&str] = &["total_time", "totalTime"];
const INGREDIENT_FIELDS: &[&str] = &[
    "ingredients",
    "recipeIngredient",
    "ingredient_lines",
    "ingredients_html",
];
const DIRECTION_FIELDS: &[&str] = &[
    "directions",
    "instructions",
    "recipeInstructions",
    "steps",
    "directions_html",
    "instructions_html",
];
const TAG_FIELDS: &[&str] = &["tags", "categories", "keywords"];
const IMAGE_FIELDS: &[&str] = &["photo_data", "image_data"];

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

/// Line-break boundaries inside HTML blocks: <br>, paragraph and list item
/// transitions.
static HTML_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p>\s*<p[^>]*>|</li>\s*<li[^>]*>|</?p>|</?li>|</?ul>|</?ol>")
        .expect("Invalid HTML break regex")
});

/// Normalize one decoded record. Returns `None` for non-objects (those are
/// skipped leaves, not errors).
pub fn normalize_record(value: &Value) -> Option<NormalizedRecipe> {
    let obj = value.as_object()?;

    Some(NormalizedRecipe {
        title: string_field(obj, TITLE_FIELDS),
        description: string_field(obj, DESCRIPTION_FIELDS),
        cuisine: string_field(obj, CUISINE_FIELDS),
        servings: string_field(obj, SERVINGS_FIELDS),
        prep_time: string_field(obj, PREP_TIME_FIELDS),
        cook_time: string_field(obj, COOK_TIME_FIELDS),
        total_time: string_field(obj, TOTAL_TIME_FIELDS),
        ingredient_lines: lines_field(obj, INGREDIENT_FIELDS),
        direction_lines: lines_field(obj, DIRECTION_FIELDS),
        tags: tags_field(obj, TAG_FIELDS),
        image: image_field(obj, IMAGE_FIELDS),
    })
}

/// First synonym that holds a non-empty string (or number, stringified).
fn string_field(obj: &serde_json::Map<String, Value>, synonyms: &[&str]) -> String {
    for field in synonyms {
        match obj.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    String::new()
}

/// First synonym that yields at least one line. Handles a structured list,
/// a newline-delimited string, or an HTML block.
fn lines_field(obj: &serde_json::Map<String, Value>, synonyms: &[&str]) -> Vec<String> {
    for field in synonyms {
        if let Some(value) = obj.get(*field) {
            let lines = value_to_lines(value);
            if !lines.is_empty() {
                return lines;
            }
        }
    }
    Vec::new()
}

fn value_to_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(item_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if looks_like_html(s) => html_to_lines(s),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Text of one structured list item: a plain string, or an object with a
/// `text` field (schema.org HowToStep shape).
fn item_text(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s),
        Value::Object(obj) => obj.get("text").and_then(Value::as_str),
        _ => None,
    }
}

fn looks_like_html(s: &str) -> bool {
    HTML_TAG_REGEX.is_match(s)
}

/// Convert an HTML block to lines: split on break boundaries, strip the
/// remaining tags, decode common entities, trim, drop empties.
fn html_to_lines(html: &str) -> Vec<String> {
    HTML_BREAK_REGEX
        .split(html)
        .flat_map(|chunk| {
            let text = HTML_TAG_REGEX.replace_all(chunk, "");
            decode_entities(&text)
                .lines()
                .map(|l| l.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

/// Decode the HTML entities that actually show up in recipe exports.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8220;", "\u{201c}")
        .replace("&#8221;", "\u{201d}")
        .replace("&deg;", "\u{00b0}")
        .replace("&frac12;", "1/2")
        .replace("&frac14;", "1/4")
        .replace("&frac34;", "3/4")
        .replace("&#038;", "&")
}

/// Tags from an array of strings or a comma-separated string.
fn tags_field(obj: &serde_json::Map<String, Value>, synonyms: &[&str]) -> BTreeSet<String> {
    for field in synonyms {
        let tags: BTreeSet<String> = match obj.get(*field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        };
        if !tags.is_empty() {
            return tags;
        }
    }
    BTreeSet::new()
}

/// Decode an embedded base64 image payload. Malformed base64 degrades to
/// "no image" - the recipe itself is fine.
fn image_field(obj: &serde_json::Map<String, Value>, synonyms: &[&str]) -> Option<RecipeImage> {
    for field in synonyms {
        if let Some(Value::String(data)) = obj.get(*field) {
            let data = data.trim();
            if data.is_empty() {
                continue;
            }
            match base64::engine::general_purpose::STANDARD.decode(data) {
                Ok(bytes) => {
                    return Some(RecipeImage {
                        filename: format!("{}.jpg", Uuid::new_v4()),
                        bytes,
                    });
                }
                Err(e) => {
                    tracing::warn!(field = *field, error = %e, "Failed to decode embedded image, skipping");
                    return None;
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use serde_json::json;

    #[test]
    fn test_structured_list_preferred() {
        let record = json!({
            "name": "Pasta",
            "ingredients": ["1 cup flour", "2 eggs"],
            "directions": "Mix.\nKnead.\nRest."
        });

        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.title, "Pasta");
        assert_eq!(recipe.ingredient_lines, vec!["1 cup flour", "2 eggs"]);
        assert_eq!(recipe.direction_lines, vec!["Mix.", "Knead.", "Rest."]);
    }

    #[test]
    fn test_newline_delimited_string() {
        let record = json!({
            "title": "Soup",
            "ingredients": "1 onion\n\n2 carrots\n  "
        });

        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.ingredient_lines, vec!["1 onion", "2 carrots"]);
    }

    #[test]
    fn test_html_block_converted_to_lines() {
        let record = json!({
            "title": "Bars",
            "ingredients_html": "<ul><li>1 cup flour</li><li>2 eggs &amp; 1 yolk</li></ul>",
            "instructions_html": "<p>Preheat oven.</p><p>Bake at 350&deg;.</p>"
        });

        let recipe = normalize_record(&record).unwrap();
        assert_eq!(
            recipe.ingredient_lines,
            vec!["1 cup flour", "2 eggs & 1 yolk"]
        );
        assert_eq!(
            recipe.direction_lines,
            vec!["Preheat oven.", "Bake at 350\u{00b0}."]
        );
    }

    #[test]
    fn test_first_match_wins_across_synonyms() {
        // Both "ingredients" and "recipeIngredient" present - first wins
        let record = json!({
            "title": "Salad",
            "ingredients": ["lettuce"],
            "recipeIngredient": ["ignored"]
        });

        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.ingredient_lines, vec!["lettuce"]);
    }

    #[test]
    fn test_howto_step_objects() {
        let record = json!({
            "name": "Bread",
            "recipeInstructions": [
                {"@type": "HowToStep", "text": "Mix the dough."},
                {"@type": "HowToStep", "text": "Bake."}
            ]
        });

        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.direction_lines, vec!["Mix the dough.", "Bake."]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let recipe = normalize_record(&json!({})).unwrap();
        assert_eq!(recipe.title, "");
        assert!(recipe.ingredient_lines.is_empty());
        assert!(recipe.direction_lines.is_empty());
        assert!(recipe.tags.is_empty());
        assert!(recipe.image.is_none());
    }

    #[test]
    fn test_non_object_is_skipped() {
        assert!(normalize_record(&json!("just a string")).is_none());
        assert!(normalize_record(&json!(42)).is_none());
    }

    #[test]
    fn test_numeric_servings_stringified() {
        let record = json!({"title": "Stew", "servings": 6});
        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.servings, "6");
    }

    #[test]
    fn test_tags_from_array_and_string() {
        let record = json!({"title": "Curry", "categories": ["Dinner", "Spicy "]});
        let recipe = normalize_record(&record).unwrap();
        assert!(recipe.tags.contains("Dinner"));
        assert!(recipe.tags.contains("Spicy"));

        let record = json!({"title": "Curry", "keywords": "quick, weeknight"});
        let recipe = normalize_record(&record).unwrap();
        assert!(recipe.tags.contains("quick"));
        assert!(recipe.tags.contains("weeknight"));
    }

    #[test]
    fn test_image_decoded_with_generated_filename() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake image bytes");
        let record = json!({"title": "Pie", "photo_data": encoded});

        let recipe = normalize_record(&record).unwrap();
        let image = recipe.image.unwrap();
        assert_eq!(image.bytes, b"fake image bytes");
        assert!(image.filename.ends_with(".jpg"));
    }

    #[test]
    fn test_malformed_image_degrades_to_none() {
        let record = json!({"title": "Pie", "photo_data": "&&& not base64 &&&"});
        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.title, "Pie");
        assert!(recipe.image.is_none());
    }
}
