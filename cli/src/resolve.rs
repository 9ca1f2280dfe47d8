//! The `resolve` command: run the batch resolution pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use larder_core::{
    resolve_recipes, vocab, MemoryStore, RecipeOutcome, ResolutionReport, ResolutionStore,
    ResolveOptions,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::store::PgStore;

pub struct ResolveArgs {
    pub recipe: Option<Uuid>,
    pub batch_size: usize,
    pub pace_ms: u64,
    pub dry_run: bool,
}

pub async fn run(pool: DbPool, args: ResolveArgs) -> Result<()> {
    let mut store = PgStore::new(pool);

    // Missing dictionary is the one fatal setup error.
    let dictionary = store.load_dictionary().map_err(anyhow::Error::from_boxed)?;
    if dictionary.is_empty() {
        anyhow::bail!("Canonical ingredient dictionary is empty or unavailable");
    }

    let recipe_ids = match args.recipe {
        Some(id) => vec![id],
        None => store.all_recipe_ids().map_err(anyhow::Error::from_boxed)?,
    };
    println!("Resolving {} recipe(s)", recipe_ids.len());

    let opts = ResolveOptions {
        batch_size: args.batch_size,
        pace: Duration::from_millis(args.pace_ms),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, stopping after the current recipe");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let report = if args.dry_run {
        let mut memory = load_into_memory(&mut store, &recipe_ids)?;
        resolve_recipes(&mut memory, &recipe_ids, vocab::standard(), &opts, &cancel)
            .await
            .map_err(anyhow::Error::from_boxed)?
    } else {
        resolve_recipes(&mut store, &recipe_ids, vocab::standard(), &opts, &cancel)
            .await
            .map_err(anyhow::Error::from_boxed)?
    };

    print_report(&report, args.dry_run);
    Ok(())
}

/// Copy the dictionary and raw lines into a memory store so a dry run
/// exercises the full pipeline without writing anything.
fn load_into_memory(store: &mut PgStore, recipe_ids: &[Uuid]) -> Result<MemoryStore> {
    let mut memory = MemoryStore::new(store.load_dictionary().map_err(anyhow::Error::from_boxed)?);
    for &recipe_id in recipe_ids {
        memory.insert_recipe(
            recipe_id,
            store.raw_lines(recipe_id).map_err(anyhow::Error::from_boxed)?,
        );
    }
    Ok(memory)
}

fn print_report(report: &ResolutionReport, dry_run: bool) {
    for result in &report.recipe_results {
        match &result.outcome {
            RecipeOutcome::Resolved { matched, unmatched } => {
                println!(
                    "  {}: {} matched, {} unmatched",
                    result.recipe_id, matched, unmatched
                );
            }
            RecipeOutcome::Skipped => {
                println!("  {}: skipped (no raw ingredient lines)", result.recipe_id);
            }
            RecipeOutcome::Failed { error } => {
                println!("  {}: FAILED - {}", result.recipe_id, error);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(50));
    if dry_run {
        println!("RESOLUTION COMPLETE (dry run, nothing written)");
    } else {
        println!("RESOLUTION COMPLETE");
    }
    println!("{}", "=".repeat(50));
    println!("Recipes succeeded: {}", report.success);
    println!("Recipes failed: {}", report.failed);
    println!("Recipes skipped: {}", report.skipped);
    println!("Ingredients matched: {}", report.matched);
    println!("Ingredients unmatched: {}", report.unmatched);
    if report.cancelled {
        println!("Run was cancelled before completing all recipes");
    }
    println!("{}", "=".repeat(50));

    if !report.unmatched_texts.is_empty() {
        println!();
        println!(
            "Unmatched ingredient texts ({}) - extend the dictionary or fix the source:",
            report.unmatched_texts.len()
        );
        for text in &report.unmatched_texts {
            println!("  {}", text);
        }
    }
}
