//! Import a recipe export archive into the datastore.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use larder_core::{decode_archive, vocab, DecodeOptions, NormalizedRecipe};

use crate::db::DbPool;
use crate::store::PgStore;

pub fn run(pool: DbPool, file: &Path, max_depth: u8) -> Result<()> {
    let payload = fs::read(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;

    let opts = DecodeOptions {
        max_depth,
        ..DecodeOptions::default()
    };
    let output = decode_archive(&payload, &opts)
        .with_context(|| format!("Failed to decode export archive: {}", file.display()))?;

    println!("Found {} recipes in archive", output.recipes.len());

    let vocab = vocab::standard();
    let mut store = PgStore::new(pool);

    let mut imported = 0;
    let mut empty = 0;
    let mut errors = 0;

    for recipe in &output.recipes {
        if recipe.title.is_empty() && recipe.ingredient_lines.is_empty() {
            tracing::warn!("Skipping record with no title and no ingredients");
            empty += 1;
            continue;
        }

        match store.insert_recipe(recipe, vocab) {
            Ok(recipe_id) => {
                println!("  Imported: {} ({})", display_title(recipe), recipe_id);
                imported += 1;
            }
            Err(e) => {
                println!("  Error importing '{}': {}", display_title(recipe), e);
                errors += 1;
            }
        }
    }

    println!();
    println!("{}", "=".repeat(50));
    println!("IMPORT COMPLETE");
    println!("{}", "=".repeat(50));
    println!("Imported: {}", imported);
    println!("Errors: {}", errors);
    println!("Empty records skipped: {}", empty);
    println!("Archive entries skipped: {}", output.stats.leaves_skipped);
    if output.stats.depth_skipped > 0 {
        println!(
            "Branches beyond depth ceiling: {}",
            output.stats.depth_skipped
        );
    }
    println!("{}", "=".repeat(50));

    Ok(())
}

fn display_title(recipe: &NormalizedRecipe) -> &str {
    if recipe.title.is_empty() {
        "(untitled)"
    } else {
        &recipe.title
    }
}
