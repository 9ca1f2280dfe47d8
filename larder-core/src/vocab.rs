//! Unit and stopword vocabularies.
//!
//! The parser and matcher take a [`Vocabulary`] argument instead of reading
//! module-level state, so tests can substitute smaller tables. The
//! production tables live here as versioned constants.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Bumped whenever the constant tables below change.
pub const VOCAB_VERSION: u32 = 1;

/// Common cooking units (lowercase for matching).
/// Sorted by length at construction (longest first) so an abbreviation
/// never shadows a longer phrase (e.g., "tablespoons" before "tb").
const UNITS: &[&str] = &[
    // Volume - US
    "fluid ounces",
    "fluid ounce",
    "tablespoons",
    "tablespoon",
    "teaspoons",
    "teaspoon",
    "gallons",
    "gallon",
    "quarts",
    "quart",
    "pints",
    "pint",
    "cups",
    "cup",
    "tbsp",
    "tbs",
    "tsp",
    "fl oz",
    "gal",
    "qt",
    "pt",
    "tb",
    "c",
    // Volume - Metric
    "milliliters",
    "milliliter",
    "liters",
    "liter",
    "litres",
    "litre",
    "ml",
    "l",
    // Weight
    "kilograms",
    "kilogram",
    "milligrams",
    "milligram",
    "ounces",
    "ounce",
    "pounds",
    "pound",
    "grams",
    "gram",
    "lbs",
    "lb",
    "oz",
    "kg",
    "mg",
    "g",
    // Length
    "centimeters",
    "centimeter",
    "inches",
    "inch",
    "cm",
    // Count
    "packages",
    "package",
    "handfuls",
    "handful",
    "bunches",
    "pinches",
    "slices",
    "sprigs",
    "stalks",
    "pieces",
    "cloves",
    "dashes",
    "sticks",
    "bunch",
    "clove",
    "cubes",
    "piece",
    "pinch",
    "slice",
    "sprig",
    "stalk",
    "heads",
    "drops",
    "cans",
    "jars",
    "bags",
    "cube",
    "dash",
    "drop",
    "head",
    "pkgs",
    "stick",
    "can",
    "jar",
    "bag",
    "pkg",
    // Size words that act like units
    "extra-large",
    "medium",
    "small",
    "large",
];

/// Preparation verbs (and their adverbs) stripped before matching.
const PREP_WORDS: &[&str] = &[
    "julienned",
    "coarsely",
    "roughly",
    "freshly",
    "lightly",
    "finely",
    "thinly",
    "quartered",
    "shredded",
    "crumbled",
    "softened",
    "chopped",
    "crushed",
    "divided",
    "drained",
    "toasted",
    "roasted",
    "trimmed",
    "chilled",
    "minced",
    "sliced",
    "grated",
    "melted",
    "ground",
    "beaten",
    "peeled",
    "rinsed",
    "packed",
    "sifted",
    "halved",
    "washed",
    "seeded",
    "diced",
    "cubed",
    "cored",
    "mixed",
];

/// State adjectives stripped before matching.
const STATE_WORDS: &[&str] = &[
    "uncooked", "organic", "canned", "cooked", "frozen", "thawed", "dried", "fresh", "whole",
    "ripe", "raw",
];

/// Size and color adjectives stripped before matching.
const SIZE_COLOR_WORDS: &[&str] = &[
    "extra-large",
    "medium",
    "large",
    "small",
    "baby",
    "yellow",
    "purple",
    "green",
    "brown",
    "white",
    "black",
    "red",
];

/// Cuisine adjectives stripped before matching.
const CUISINE_WORDS: &[&str] = &[
    "italian", "mexican", "chinese", "japanese", "spanish", "french", "indian", "korean", "greek",
    "thai",
];

/// Filler words stripped before matching.
const FILLER_WORDS: &[&str] = &[
    "approximately",
    "optional",
    "needed",
    "without",
    "taste",
    "about",
    "plus",
    "more",
    "with",
    "and",
    "for",
    "the",
    "of",
    "or",
    "to",
    "as",
    "an",
    "a",
];

/// Immutable unit/stopword tables injected into the parser and matcher.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Unit names ordered longest-first; the first prefix match wins.
    units: Vec<String>,
    /// Flat lookup of every unit word, for cleaning and parenthetical checks.
    unit_set: HashSet<String>,
    /// Union of prep, state, size/color, cuisine, and filler words.
    stopwords: HashSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary from explicit tables. Unit order is normalized to
    /// longest-first here; callers pass tables in any order.
    pub fn new(units: &[&str], stopword_tables: &[&[&str]]) -> Self {
        let mut units: Vec<String> = units.iter().map(|u| u.to_lowercase()).collect();
        units.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let unit_set = units.iter().cloned().collect();
        let stopwords = stopword_tables
            .iter()
            .flat_map(|table| table.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            units,
            unit_set,
            stopwords,
        }
    }

    /// The production tables.
    pub fn standard() -> Self {
        Self::new(
            UNITS,
            &[
                PREP_WORDS,
                STATE_WORDS,
                SIZE_COLOR_WORDS,
                CUISINE_WORDS,
                FILLER_WORDS,
            ],
        )
    }

    /// Unit names, longest first.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn is_unit_word(&self, word: &str) -> bool {
        self.unit_set.contains(&word.to_lowercase())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }
}

static STANDARD: LazyLock<Vocabulary> = LazyLock::new(Vocabulary::standard);

/// Shared instance of the production vocabulary.
pub fn standard() -> &'static Vocabulary {
    &STANDARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_sorted_longest_first() {
        let vocab = Vocabulary::standard();
        let units = vocab.units();
        for pair in units.windows(2) {
            assert!(pair[0].len() >= pair[1].len());
        }
        // "tablespoons" must come before its abbreviations
        let long = units.iter().position(|u| u == "tablespoons").unwrap();
        let short = units.iter().position(|u| u == "tb").unwrap();
        assert!(long < short);
    }

    #[test]
    fn test_word_lookups() {
        let vocab = Vocabulary::standard();
        assert!(vocab.is_unit_word("Cup"));
        assert!(vocab.is_stopword("chopped"));
        assert!(vocab.is_stopword("FRESH"));
        assert!(!vocab.is_stopword("tomato"));
    }

    #[test]
    fn test_custom_tables() {
        let vocab = Vocabulary::new(&["scoop", "scoops"], &[&["imaginary"]]);
        assert!(vocab.is_unit_word("scoops"));
        assert!(!vocab.is_unit_word("cup"));
        assert!(vocab.is_stopword("imaginary"));
        assert!(!vocab.is_stopword("fresh"));
    }
}
