//! Storage abstraction for batch resolution.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::types::{CanonicalIngredient, IngredientDetail, RawIngredientLine};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Access to the persisted ingredient tables.
/// Implemented against the database by the CLI and in memory for tests.
pub trait ResolutionStore: Send {
    /// The full canonical ingredient dictionary. Callers sort it ascending
    /// by `ingredient_id` before matching.
    fn load_dictionary(&mut self) -> Result<Vec<CanonicalIngredient>, StoreError>;

    /// Every recipe id in the collection.
    fn all_recipe_ids(&mut self) -> Result<Vec<Uuid>, StoreError>;

    /// The raw ingredient lines stored against one recipe, in position
    /// order.
    fn raw_lines(&mut self, recipe_id: Uuid) -> Result<Vec<RawIngredientLine>, StoreError>;

    /// Atomically replace the recipe's detail-record set (delete then
    /// insert as one logical unit). Backends without transactions follow
    /// the documented fallback: the delete stands even when the insert
    /// fails, leaving the recipe with zero detail records - a detectable
    /// state, not corruption.
    fn replace_details(
        &mut self,
        recipe_id: Uuid,
        rows: &[IngredientDetail],
    ) -> Result<(), StoreError>;
}

/// In-memory store for tests and dry runs.
///
/// `fail_replace` simulates the no-transaction fallback: a listed recipe's
/// delete succeeds and its insert fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub dictionary: Vec<CanonicalIngredient>,
    lines: HashMap<Uuid, Vec<RawIngredientLine>>,
    details: HashMap<Uuid, Vec<IngredientDetail>>,
    pub fail_replace: HashSet<Uuid>,
    order: Vec<Uuid>,
}

impl MemoryStore {
    pub fn new(dictionary: Vec<CanonicalIngredient>) -> Self {
        Self {
            dictionary,
            ..Self::default()
        }
    }

    /// Register a recipe with raw lines built from the given texts.
    pub fn add_recipe(&mut self, line_texts: &[&str]) -> Uuid {
        let recipe_id = Uuid::new_v4();
        let lines = line_texts
            .iter()
            .enumerate()
            .map(|(position, text)| RawIngredientLine {
                recipe_id,
                line_id: Uuid::new_v4(),
                position: position as i32,
                raw_text: text.to_string(),
                amount: None,
                unit: None,
                known_ingredient_id: None,
            })
            .collect();
        self.insert_recipe(recipe_id, lines);
        recipe_id
    }

    /// Register a recipe with fully-specified raw lines.
    pub fn insert_recipe(&mut self, recipe_id: Uuid, lines: Vec<RawIngredientLine>) {
        self.lines.insert(recipe_id, lines);
        self.order.push(recipe_id);
    }

    /// The current detail set for a recipe, empty when none was written.
    pub fn details_for(&self, recipe_id: Uuid) -> &[IngredientDetail] {
        self.details.get(&recipe_id).map_or(&[], Vec::as_slice)
    }
}

impl ResolutionStore for MemoryStore {
    fn load_dictionary(&mut self) -> Result<Vec<CanonicalIngredient>, StoreError> {
        Ok(self.dictionary.clone())
    }

    fn all_recipe_ids(&mut self) -> Result<Vec<Uuid>, StoreError> {
        Ok(self.order.clone())
    }

    fn raw_lines(&mut self, recipe_id: Uuid) -> Result<Vec<RawIngredientLine>, StoreError> {
        Ok(self.lines.get(&recipe_id).cloned().unwrap_or_default())
    }

    fn replace_details(
        &mut self,
        recipe_id: Uuid,
        rows: &[IngredientDetail],
    ) -> Result<(), StoreError> {
        // Delete first, as the real store does.
        self.details.remove(&recipe_id);
        if self.fail_replace.contains(&recipe_id) {
            return Err(format!("simulated insert failure for recipe {recipe_id}").into());
        }
        self.details.insert(recipe_id, rows.to_vec());
        Ok(())
    }
}
