use diesel::prelude::*;
use larder_core::{CanonicalIngredient, RawIngredientLine};
use uuid::Uuid;

use crate::schema::{ingredients, recipe_ingredient_details, recipe_ingredient_lines, recipes};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IngredientRow {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
}

impl From<IngredientRow> for CanonicalIngredient {
    fn from(row: IngredientRow) -> Self {
        CanonicalIngredient {
            ingredient_id: row.id,
            name: row.name,
            category_id: row.category_id,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipe_ingredient_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RawLineRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub position: i32,
    pub raw_text: String,
    pub amount: Option<String>,
    pub unit: Option<String>,
    pub known_ingredient_id: Option<i32>,
}

impl From<RawLineRow> for RawIngredientLine {
    fn from(row: RawLineRow) -> Self {
        RawIngredientLine {
            recipe_id: row.recipe_id,
            line_id: row.id,
            position: row.position,
            raw_text: row.raw_text,
            amount: row.amount,
            unit: row.unit,
            known_ingredient_id: row.known_ingredient_id,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recipes)]
pub struct NewRecipe<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub cuisine: &'a str,
    pub servings: &'a str,
    pub prep_time: &'a str,
    pub cook_time: &'a str,
    pub total_time: &'a str,
    pub directions: &'a str,
    pub tags: &'a [Option<String>],
    pub image_filename: Option<&'a str>,
    pub image_data: Option<&'a [u8]>,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_ingredient_lines)]
pub struct NewRawLine {
    pub recipe_id: Uuid,
    pub position: i32,
    pub raw_text: String,
    pub amount: Option<String>,
    pub unit: Option<String>,
    pub known_ingredient_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_ingredient_details)]
pub struct NewDetailRow<'a> {
    pub recipe_id: Uuid,
    pub source_line_id: Option<Uuid>,
    pub ingredient_id: Option<i32>,
    pub original_text: &'a str,
    pub matched_term: Option<&'a str>,
    pub match_type: Option<&'a str>,
}
