//! Database operations for the `saved_recipes` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `saved_recipes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavedRecipeRow {
    pub id: i64,
    pub user_id: String,
    /// The recipe-search API's recipe id.
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Value,
    pub saved_at: DateTime<Utc>,
}

/// Fields accepted by [`insert_saved_recipe`].
#[derive(Debug, Clone)]
pub struct NewSavedRecipe {
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Value,
}

/// Lists a user's saved recipes, most recently saved first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_saved_recipes(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<SavedRecipeRow>, DbError> {
    let rows = sqlx::query_as::<_, SavedRecipeRow>(
        "SELECT id, user_id, recipe_id, title, image_url, source_url, ingredients, saved_at \
         FROM saved_recipes WHERE user_id = $1 ORDER BY saved_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Saves a recipe for a user, returning the stored row.
///
/// Saving the same recipe twice is idempotent: the conflict on
/// `(user_id, recipe_id)` refreshes the stored title/image/ingredients
/// rather than creating a duplicate.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_saved_recipe(
    pool: &PgPool,
    user_id: &str,
    recipe: &NewSavedRecipe,
) -> Result<SavedRecipeRow, DbError> {
    let row = sqlx::query_as::<_, SavedRecipeRow>(
        "INSERT INTO saved_recipes \
         (user_id, recipe_id, title, image_url, source_url, ingredients) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (user_id, recipe_id) DO UPDATE SET \
           title = EXCLUDED.title, \
           image_url = EXCLUDED.image_url, \
           source_url = EXCLUDED.source_url, \
           ingredients = EXCLUDED.ingredients \
         RETURNING id, user_id, recipe_id, title, image_url, source_url, ingredients, saved_at",
    )
    .bind(user_id)
    .bind(recipe.recipe_id)
    .bind(&recipe.title)
    .bind(recipe.image_url.as_deref())
    .bind(recipe.source_url.as_deref())
    .bind(&recipe.ingredients)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Deletes a saved recipe by row id, scoped to the owning user.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the row does not exist or belongs to a
/// different user, or [`DbError::Sqlx`] on query failure.
pub async fn delete_saved_recipe(pool: &PgPool, user_id: &str, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM saved_recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
