//! Database operations for the `profiles` table.
//!
//! Profiles are keyed by the retail partner's user identifier; every
//! operation is a single-row point read or write filtered by that id.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub display_name: Option<String>,
    pub home_zip: Option<String>,
    pub preferred_location_id: Option<String>,
    pub dietary_preferences: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by [`upsert_profile`]. `dietary_preferences` defaults to
/// an empty JSON array when `None`.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub home_zip: Option<String>,
    pub preferred_location_id: Option<String>,
    pub dietary_preferences: Option<Value>,
}

/// Fetches a profile by user id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile exists for `user_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn get_profile(pool: &PgPool, user_id: &str) -> Result<ProfileRow, DbError> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT user_id, display_name, home_zip, preferred_location_id, \
         dietary_preferences, created_at, updated_at \
         FROM profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Inserts or updates a profile row, returning the stored row.
///
/// Conflicts on `user_id` update all mutable fields and bump `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<ProfileRow, DbError> {
    let preferences = update
        .dietary_preferences
        .clone()
        .unwrap_or_else(|| Value::Array(vec![]));

    let row = sqlx::query_as::<_, ProfileRow>(
        "INSERT INTO profiles \
         (user_id, display_name, home_zip, preferred_location_id, dietary_preferences) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (user_id) DO UPDATE SET \
           display_name = EXCLUDED.display_name, \
           home_zip = EXCLUDED.home_zip, \
           preferred_location_id = EXCLUDED.preferred_location_id, \
           dietary_preferences = EXCLUDED.dietary_preferences, \
           updated_at = NOW() \
         RETURNING user_id, display_name, home_zip, preferred_location_id, \
           dietary_preferences, created_at, updated_at",
    )
    .bind(user_id)
    .bind(update.display_name.as_deref())
    .bind(update.home_zip.as_deref())
    .bind(update.preferred_location_id.as_deref())
    .bind(preferences)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Deletes a profile by user id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile exists for `user_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn delete_profile(pool: &PgPool, user_id: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
