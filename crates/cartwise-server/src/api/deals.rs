//! Current-deals sweep across the grocery category list.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use cartwise_deals::{aggregate, fetch_deals, DealItem, CATEGORY_TERMS};

use crate::middleware::RequestId;

use super::{map_retail_error, missing_parameter, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct DealsQuery {
    pub location_id: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/v1/deals?location_id=01400943&limit=50
pub async fn list_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DealsQuery>,
) -> Result<Json<ApiResponse<Vec<DealItem>>>, ApiError> {
    let Some(location_id) = query.location_id.as_deref().filter(|l| !l.trim().is_empty()) else {
        return Err(missing_parameter(req_id.0, "location_id"));
    };

    let cap = query
        .limit
        .map_or(state.config.deals_cap, |l| l.min(state.config.deals_cap));

    let token = state
        .tokens
        .ensure_app_token()
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    let records = fetch_deals(
        &state.retail,
        &token.access_token,
        location_id.trim(),
        CATEGORY_TERMS,
        state.config.deals_batch_size,
    )
    .await;
    let deals = aggregate(&records, cap);

    tracing::debug!(
        location_id = %location_id,
        records = records.len(),
        deals = deals.len(),
        "deal sweep complete"
    );

    Ok(Json(ApiResponse {
        data: deals,
        meta: ResponseMeta::new(req_id.0),
    }))
}
