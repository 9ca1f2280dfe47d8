//! Batch ingredient resolution.
//!
//! The orchestrator walks a recipe collection, parses and matches every raw
//! ingredient line, and replaces each recipe's detail-record set through a
//! [`ResolutionStore`]. Storage is a trait so the CLI can plug in its
//! database-backed implementation and tests can run against
//! [`MemoryStore`].

mod orchestrator;
mod store;

pub use orchestrator::{
    resolve_recipes, RecipeOutcome, RecipeResolution, ResolutionReport, ResolveOptions,
};
pub use store::{MemoryStore, ResolutionStore, StoreError};
