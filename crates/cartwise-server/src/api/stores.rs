//! Store lookup by zip code.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_retail_error, missing_parameter, ApiError, ApiResponse, AppState, ResponseMeta};

const STORE_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct StoresQuery {
    pub zip: Option<String>,
}

/// GET /api/v1/stores?zip=45202
pub async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StoresQuery>,
) -> Result<Json<ApiResponse<Vec<cartwise_retail::LocationRecord>>>, ApiError> {
    let Some(zip) = query.zip.as_deref().filter(|z| !z.trim().is_empty()) else {
        return Err(missing_parameter(req_id.0, "zip"));
    };

    let token = state
        .tokens
        .ensure_app_token()
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;
    let locations = state
        .retail
        .locations_by_zip(&token.access_token, zip.trim(), STORE_LIMIT)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: locations,
        meta: ResponseMeta::new(req_id.0),
    }))
}
