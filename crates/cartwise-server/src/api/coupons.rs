//! Digital coupon listing and clipping, on behalf of the signed-in user.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use cartwise_retail::CouponRecord;

use crate::middleware::{RequestId, SessionUser};

use super::{map_retail_error, missing_parameter, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct CouponsQuery {
    pub location_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClipResult {
    pub coupon_id: String,
    pub clipped: bool,
}

/// GET /api/v1/coupons?location_id=01400943
pub async fn list_coupons(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<CouponsQuery>,
) -> Result<Json<ApiResponse<Vec<CouponRecord>>>, ApiError> {
    let Some(location_id) = query.location_id.as_deref().filter(|l| !l.trim().is_empty()) else {
        return Err(missing_parameter(req_id.0, "location_id"));
    };

    let token = state
        .tokens
        .ensure_user_token(&user.0)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;
    let coupons = state
        .retail
        .list_coupons(&token.access_token, location_id.trim())
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: coupons,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/coupons/{coupon_id}/clip
pub async fn clip_coupon(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Path(coupon_id): Path<String>,
) -> Result<Json<ApiResponse<ClipResult>>, ApiError> {
    let token = state
        .tokens
        .ensure_user_token(&user.0)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;
    state
        .retail
        .clip_coupon(&token.access_token, &coupon_id)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    tracing::info!(user_id = %user.0, coupon_id = %coupon_id, "coupon clipped");

    Ok(Json(ApiResponse {
        data: ClipResult {
            coupon_id,
            clipped: true,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
