//! Database-backed implementation of the resolution store.

use diesel::prelude::*;
use larder_core::{
    parse_ingredient, CanonicalIngredient, IngredientDetail, NormalizedRecipe, RawIngredientLine,
    ResolutionStore, StoreError, Vocabulary,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{IngredientRow, NewDetailRow, NewRawLine, NewRecipe, RawLineRow};
use crate::schema::{ingredients, recipe_ingredient_details, recipe_ingredient_lines, recipes};

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Persist a normalized recipe and its raw ingredient lines in one
    /// transaction, returning the new recipe id. Lines are pre-parsed so
    /// the stored amount/unit columns are queryable without re-parsing.
    pub fn insert_recipe(
        &mut self,
        recipe: &NormalizedRecipe,
        vocab: &Vocabulary,
    ) -> Result<Uuid, StoreError> {
        let mut conn = self.pool.get()?;

        let directions = recipe.direction_lines.join("\n");
        let tags: Vec<Option<String>> = recipe.tags.iter().cloned().map(Some).collect();

        let new_recipe = NewRecipe {
            title: &recipe.title,
            description: &recipe.description,
            cuisine: &recipe.cuisine,
            servings: &recipe.servings,
            prep_time: &recipe.prep_time,
            cook_time: &recipe.cook_time,
            total_time: &recipe.total_time,
            directions: &directions,
            tags: &tags,
            image_filename: recipe.image.as_ref().map(|i| i.filename.as_str()),
            image_data: recipe.image.as_ref().map(|i| i.bytes.as_slice()),
        };

        let recipe_id = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let recipe_id: Uuid = diesel::insert_into(recipes::table)
                .values(&new_recipe)
                .returning(recipes::id)
                .get_result(conn)?;

            let new_lines: Vec<NewRawLine> = recipe
                .ingredient_lines
                .iter()
                .enumerate()
                .map(|(position, text)| {
                    let parsed = parse_ingredient(text, vocab);
                    NewRawLine {
                        recipe_id,
                        position: position as i32,
                        raw_text: text.clone(),
                        amount: (!parsed.amount.is_empty()).then_some(parsed.amount),
                        unit: (!parsed.unit.is_empty()).then_some(parsed.unit),
                        known_ingredient_id: None,
                    }
                })
                .collect();
            diesel::insert_into(recipe_ingredient_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            Ok(recipe_id)
        })?;

        Ok(recipe_id)
    }
}

impl ResolutionStore for PgStore {
    fn load_dictionary(&mut self) -> Result<Vec<CanonicalIngredient>, StoreError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<IngredientRow> = ingredients::table
            .order(ingredients::id.asc())
            .select(IngredientRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn all_recipe_ids(&mut self) -> Result<Vec<Uuid>, StoreError> {
        let mut conn = self.pool.get()?;
        let ids = recipes::table
            .select(recipes::id)
            .order(recipes::id.asc())
            .load(&mut conn)?;
        Ok(ids)
    }

    fn raw_lines(&mut self, recipe_id: Uuid) -> Result<Vec<RawIngredientLine>, StoreError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<RawLineRow> = recipe_ingredient_lines::table
            .filter(recipe_ingredient_lines::recipe_id.eq(recipe_id))
            .order(recipe_ingredient_lines::position.asc())
            .select(RawLineRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn replace_details(
        &mut self,
        recipe_id: Uuid,
        rows: &[IngredientDetail],
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;

        let new_rows: Vec<NewDetailRow> = rows
            .iter()
            .map(|detail| NewDetailRow {
                recipe_id,
                source_line_id: detail.source_line_id,
                ingredient_id: detail.ingredient_id,
                original_text: &detail.original_text,
                matched_term: detail.matched_term.as_deref(),
                match_type: detail.match_type.map(|m| m.as_str()),
            })
            .collect();

        // Delete and insert as one transaction: a recipe never exposes a
        // partially-replaced detail set.
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                recipe_ingredient_details::table
                    .filter(recipe_ingredient_details::recipe_id.eq(recipe_id)),
            )
            .execute(conn)?;
            diesel::insert_into(recipe_ingredient_details::table)
                .values(&new_rows)
                .execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }
}
