// Hand-maintained mapping of the externally-owned ingredient tables.
// The schema itself (and its migrations) belongs to the main application;
// this pipeline only reads the dictionary and raw lines and writes detail
// records.

diesel::table! {
    ingredients (id) {
        id -> Int4,
        name -> Varchar,
        category_id -> Int4,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        cuisine -> Varchar,
        servings -> Varchar,
        prep_time -> Varchar,
        cook_time -> Varchar,
        total_time -> Varchar,
        directions -> Text,
        tags -> Array<Nullable<Varchar>>,
        image_filename -> Nullable<Varchar>,
        image_data -> Nullable<Bytea>,
    }
}

diesel::table! {
    recipe_ingredient_lines (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        position -> Int4,
        raw_text -> Text,
        amount -> Nullable<Varchar>,
        unit -> Nullable<Varchar>,
        known_ingredient_id -> Nullable<Int4>,
    }
}

diesel::table! {
    recipe_ingredient_details (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        source_line_id -> Nullable<Uuid>,
        ingredient_id -> Nullable<Int4>,
        original_text -> Text,
        matched_term -> Nullable<Varchar>,
        match_type -> Nullable<Varchar>,
    }
}

diesel::joinable!(recipe_ingredient_lines -> recipes (recipe_id));
diesel::joinable!(recipe_ingredient_details -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    ingredients,
    recipes,
    recipe_ingredient_lines,
    recipe_ingredient_details,
);
