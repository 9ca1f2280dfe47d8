pub mod archive;
pub mod error;
pub mod ingredient_parser;
pub mod matcher;
pub mod normalize;
pub mod resolve;
pub mod types;
pub mod vocab;

pub use archive::{decode_archive, DecodeOptions, DecodeOutput, DecodeStats};
pub use error::DecodeError;
pub use ingredient_parser::{parse_ingredient, ParsedIngredient};
pub use matcher::{clean_name, match_ingredient, ACCEPT_THRESHOLD, EXACT_BOUNDARY};
pub use normalize::normalize_record;
pub use resolve::{
    resolve_recipes, MemoryStore, RecipeOutcome, RecipeResolution, ResolutionReport,
    ResolutionStore, ResolveOptions, StoreError,
};
pub use types::{
    CanonicalIngredient, IngredientDetail, MatchResult, MatchType, NormalizedRecipe,
    RawIngredientLine, RecipeImage,
};
pub use vocab::{Vocabulary, VOCAB_VERSION};
