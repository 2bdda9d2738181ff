//! Profile CRUD for the signed-in user.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cartwise_db::{ProfileRow, ProfileUpdate};

use crate::middleware::{RequestId, SessionUser};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user_id: String,
    pub display_name: Option<String>,
    pub home_zip: Option<String>,
    pub preferred_location_id: Option<String>,
    pub dietary_preferences: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileView {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            display_name: row.display_name,
            home_zip: row.home_zip,
            preferred_location_id: row.preferred_location_id,
            dietary_preferences: row.dietary_preferences,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub display_name: Option<String>,
    pub home_zip: Option<String>,
    pub preferred_location_id: Option<String>,
    pub dietary_preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let row = cartwise_db::get_profile(&state.pool, &user.0)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/profile
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    if let Some(prefs) = &request.dietary_preferences {
        if !prefs.is_array() {
            return Err(ApiError::new(
                req_id.0,
                "bad_request",
                "'dietary_preferences' must be a JSON array",
            ));
        }
    }

    let update = ProfileUpdate {
        display_name: request.display_name,
        home_zip: request.home_zip,
        preferred_location_id: request.preferred_location_id,
        dietary_preferences: request.dietary_preferences,
    };
    let row = cartwise_db::upsert_profile(&state.pool, &user.0, &update)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/profile
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<DeleteResult>>, ApiError> {
    cartwise_db::delete_profile(&state.pool, &user.0)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(user_id = %user.0, "profile deleted");

    Ok(Json(ApiResponse {
        data: DeleteResult { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
