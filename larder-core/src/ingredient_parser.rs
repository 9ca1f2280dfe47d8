//! Ingredient line parsing.
//!
//! Splits a raw ingredient line (e.g., "2 cups flour, sifted") into an
//! amount, a unit, and the ingredient name. Pure functions, no I/O.

use serde::{Deserialize, Serialize};

use crate::vocab::Vocabulary;

/// Parsed ingredient line.
///
/// `name` is never empty: when nothing structured can be extracted, the
/// full original line is used as the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    pub amount: String,
    pub unit: String,
    pub name: String,
    pub original: String,
}

/// Parse a single ingredient line.
///
/// Best-effort and deterministic: a line with no recognizable amount or
/// unit comes back with those fields empty and the whole line as the name.
pub fn parse_ingredient(raw: &str, vocab: &Vocabulary) -> ParsedIngredient {
    let original = raw.trim();

    let mut remaining = strip_bullet(original);

    let (amount, rest) = extract_amount(remaining);
    remaining = rest;

    let (mut unit, rest) = extract_unit(remaining, vocab);
    remaining = rest;

    // "1 (14 oz) can tomatoes" style: when no unit matched and a
    // parenthetical holding a unit word follows, the parenthetical is the
    // unit.
    if unit.is_empty() {
        if let Some((paren_unit, rest)) = take_parenthetical_unit(remaining, vocab) {
            unit = paren_unit;
            remaining = rest;
        }
    }

    let name = remaining
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '-'))
        .trim();

    ParsedIngredient {
        amount,
        unit,
        name: if name.is_empty() {
            original.to_string()
        } else {
            name.to_string()
        },
        original: original.to_string(),
    }
}

/// Strip a leading bullet or dash marker ("- 2 cups flour", "* salt").
fn strip_bullet(s: &str) -> &str {
    let trimmed = s.trim_start();
    for marker in ["- ", "* ", "\u{2022} ", "\u{2013} ", "\u{2014} "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// Split off the first whitespace-delimited word.
fn split_first_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

/// Extract a leading amount token: integer, decimal, simple fraction,
/// hyphenated range, or mixed number ("1 1/2"). Returns the amount (may be
/// empty) and the remaining text.
fn extract_amount(s: &str) -> (String, &str) {
    let s = s.trim();
    if s.is_empty() {
        return (String::new(), s);
    }

    let (first, rest) = split_first_word(s);

    // Mixed number: whole number followed by a fraction word.
    if is_integer(first) {
        let (second, rest2) = split_first_word(rest);
        if is_fraction(second) {
            return (format!("{} {}", first, second), rest2);
        }
    }

    if is_amount_token(first) {
        return (first.to_string(), rest);
    }

    (String::new(), s)
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_decimal(s: &str) -> bool {
    let mut dots = 0;
    !s.is_empty()
        && s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| {
            if c == '.' {
                dots += 1;
                dots == 1
            } else {
                c.is_ascii_digit()
            }
        })
}

/// "1/2", "3/4" - digits on both sides of a single slash.
fn is_fraction(s: &str) -> bool {
    match s.split_once('/') {
        Some((num, den)) => is_integer(num) && is_integer(den),
        None => false,
    }
}

/// "1-2", "2.5-3", "1/2-3/4" - simple amounts on both sides of a hyphen.
fn is_range(s: &str) -> bool {
    match s.split_once('-') {
        Some((low, high)) => is_simple_amount(low) && is_simple_amount(high),
        None => false,
    }
}

fn is_simple_amount(s: &str) -> bool {
    is_integer(s) || is_decimal(s) || is_fraction(s)
}

fn is_amount_token(s: &str) -> bool {
    is_simple_amount(s) || is_range(s)
}

/// Extract a unit from the start of the text as a case-insensitive
/// whole-word prefix. The vocabulary's longest-first order is the
/// tie-break, so "tablespoons" wins over "tb".
fn extract_unit<'a>(s: &'a str, vocab: &Vocabulary) -> (String, &'a str) {
    let s = s.trim_start();
    let s_lower = s.to_lowercase();

    for unit in vocab.units() {
        if s_lower.starts_with(unit.as_str()) {
            let after = &s[unit.len()..];
            if after.is_empty()
                || after.starts_with(|c: char| c.is_whitespace() || c == '.' || c == ',')
            {
                let remaining = after.trim_start_matches('.').trim_start();
                return (unit.clone(), remaining);
            }
        }
    }

    (String::new(), s)
}

/// When the text starts with a parenthetical whose contents mention a known
/// unit ("(14 oz)"), use the contents as the unit and advance past it.
fn take_parenthetical_unit<'a>(s: &'a str, vocab: &Vocabulary) -> Option<(String, &'a str)> {
    let s = s.trim_start();
    let inner = s.strip_prefix('(')?;
    let close = inner.find(')')?;
    let content = inner[..close].trim();

    let mentions_unit = content
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|w| vocab.is_unit_word(w));
    if !mentions_unit {
        return None;
    }

    Some((content.to_string(), inner[close + 1..].trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;

    fn parse(raw: &str) -> ParsedIngredient {
        parse_ingredient(raw, vocab::standard())
    }

    #[test]
    fn test_amount_unit_name() {
        let result = parse("2 tablespoons olive oil");
        assert_eq!(result.amount, "2");
        assert_eq!(result.unit, "tablespoons");
        assert_eq!(result.name, "olive oil");
    }

    #[test]
    fn test_fraction_amount() {
        let result = parse("1/2 teaspoon salt");
        assert_eq!(result.amount, "1/2");
        assert_eq!(result.unit, "teaspoon");
        assert_eq!(result.name, "salt");
    }

    #[test]
    fn test_mixed_number() {
        let result = parse("1 1/2 cups water");
        assert_eq!(result.amount, "1 1/2");
        assert_eq!(result.unit, "cups");
        assert_eq!(result.name, "water");
    }

    #[test]
    fn test_decimal_amount() {
        let result = parse("2.5 oz cream cheese");
        assert_eq!(result.amount, "2.5");
        assert_eq!(result.unit, "oz");
        assert_eq!(result.name, "cream cheese");
    }

    #[test]
    fn test_hyphenated_range() {
        let result = parse("2-3 cloves garlic");
        assert_eq!(result.amount, "2-3");
        assert_eq!(result.unit, "cloves");
        assert_eq!(result.name, "garlic");
    }

    #[test]
    fn test_no_amount_no_unit() {
        let result = parse("salt and pepper to taste");
        assert_eq!(result.amount, "");
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "salt and pepper to taste");
    }

    #[test]
    fn test_amount_without_unit() {
        let result = parse("3 eggs");
        assert_eq!(result.amount, "3");
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "eggs");
    }

    #[test]
    fn test_bullet_marker_stripped() {
        let result = parse("- 2 cups flour");
        assert_eq!(result.amount, "2");
        assert_eq!(result.unit, "cups");
        assert_eq!(result.name, "flour");
    }

    #[test]
    fn test_parenthetical_unit() {
        let result = parse("1 (14 oz) can diced tomatoes");
        assert_eq!(result.amount, "1");
        assert_eq!(result.unit, "14 oz");
        assert_eq!(result.name, "can diced tomatoes");
    }

    #[test]
    fn test_parenthetical_without_unit_left_in_name() {
        let result = parse("2 shallots (from the garden)");
        assert_eq!(result.amount, "2");
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "shallots (from the garden)");
    }

    #[test]
    fn test_unit_abbreviation_not_shadowed() {
        // "tablespoons" must win over the shorter "tb"/"tbs" entries
        let result = parse("2 tablespoons butter");
        assert_eq!(result.unit, "tablespoons");

        let result = parse("1 tbsp olive oil");
        assert_eq!(result.unit, "tbsp");
    }

    #[test]
    fn test_unit_requires_word_boundary() {
        // "cupcake liners" must not match the unit "cup"
        let result = parse("12 cupcake liners");
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "cupcake liners");
    }

    #[test]
    fn test_leading_comma_stripped_from_name() {
        let result = parse("1 cup, packed brown sugar");
        assert_eq!(result.unit, "cup");
        assert_eq!(result.name, "packed brown sugar");
    }

    #[test]
    fn test_amount_only_falls_back_to_original() {
        let result = parse("2");
        assert_eq!(result.amount, "2");
        assert_eq!(result.name, "2");
    }

    #[test]
    fn test_empty_line_falls_back_to_original() {
        let result = parse("");
        assert_eq!(result.amount, "");
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "");
        assert_eq!(result.original, "");
    }

    #[test]
    fn test_preserves_original() {
        let result = parse("  2 cups flour, sifted  ");
        assert_eq!(result.original, "2 cups flour, sifted");
        assert_eq!(result.name, "flour, sifted");
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = Vocabulary::new(&["scoops", "scoop"], &[]);
        let result = parse_ingredient("2 scoops protein powder", &vocab);
        assert_eq!(result.unit, "scoops");
        assert_eq!(result.name, "protein powder");

        // "cups" is not a unit in this vocabulary
        let result = parse_ingredient("2 cups flour", &vocab);
        assert_eq!(result.unit, "");
        assert_eq!(result.name, "cups flour");
    }
}
