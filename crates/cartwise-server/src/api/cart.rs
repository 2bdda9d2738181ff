//! Cart add-items passthrough for the signed-in user.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use cartwise_retail::CartItem;

use crate::middleware::{RequestId, SessionUser};

use super::{map_retail_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct CartResult {
    pub added: usize,
}

/// PUT /api/v1/cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<CartRequest>,
) -> Result<Json<ApiResponse<CartResult>>, ApiError> {
    if request.items.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "'items' must contain at least one entry",
        ));
    }

    let token = state
        .tokens
        .ensure_user_token(&user.0)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;
    state
        .retail
        .add_to_cart(&token.access_token, &request.items)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    tracing::info!(user_id = %user.0, items = request.items.len(), "items added to cart");

    Ok(Json(ApiResponse {
        data: CartResult {
            added: request.items.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
