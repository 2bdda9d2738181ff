//! Recipe search, LLM-backed recipe generation, savings attribution, and
//! the signed-in user's saved-recipe list.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cartwise_db::NewSavedRecipe;
use cartwise_deals::{aggregate, attribute, fetch_deals, SavingsAttribution, CATEGORY_TERMS};
use cartwise_recipes::{RecipeSearchParams, RecipeSummary};

use crate::middleware::{maybe_session_user, RequestId, SessionUser};

use super::{
    map_db_error, map_recipes_error, map_retail_error, missing_parameter, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub include_ingredients: Option<String>,
    #[serde(rename = "type")]
    pub recipe_type: Option<String>,
    pub diet: Option<String>,
    pub max_calories: Option<u32>,
    pub min_fiber: Option<u32>,
    pub number: Option<u32>,
}

/// GET /api/v1/recipes/search
pub async fn search_recipes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<RecipeSummary>>>, ApiError> {
    let params = RecipeSearchParams {
        include_ingredients: query.include_ingredients,
        recipe_type: query.recipe_type,
        diet: query.diet,
        max_calories: query.max_calories,
        min_fiber: query.min_fiber,
        number: query.number,
    };

    let results = state
        .recipes
        .search(&params)
        .await
        .map_err(|e| map_recipes_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: results,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/recipes/generate
///
/// Forwards the request body to the LLM provider verbatim and relays the
/// provider's status code and body back to the caller. Provider-side
/// failures (quota, rate limits) are the caller's to interpret.
pub async fn generate_recipe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let (status, response) = state
        .llm
        .complete(&body)
        .await
        .map_err(|e| map_recipes_error(req_id.0, &e))?;

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct SavingsRequest {
    pub location_id: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SavingsView {
    pub attribution: SavingsAttribution,
    /// True when the signed-in user's coupons were considered.
    pub coupons_checked: bool,
}

/// POST /api/v1/recipes/savings
///
/// Matches a recipe's ingredient list against the current deal sweep, and,
/// when a session is present, against the user's clippable coupons. Coupon
/// lookup failures degrade to a deals-only answer rather than failing the
/// request.
pub async fn recipe_savings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(request): Json<SavingsRequest>,
) -> Result<Json<ApiResponse<SavingsView>>, ApiError> {
    let Some(location_id) = request
        .location_id
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    else {
        return Err(missing_parameter(req_id.0, "location_id"));
    };
    if request.ingredients.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "'ingredients' must contain at least one entry",
        ));
    }

    let app_token = state
        .tokens
        .ensure_app_token()
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;
    let records = fetch_deals(
        &state.retail,
        &app_token.access_token,
        location_id.trim(),
        CATEGORY_TERMS,
        state.config.deals_batch_size,
    )
    .await;
    let deals = aggregate(&records, state.config.deals_cap);

    let mut coupons = Vec::new();
    let mut coupons_checked = false;
    if let Some(user_id) = maybe_session_user(&headers) {
        match state.tokens.ensure_user_token(&user_id).await {
            Ok(token) => match state
                .retail
                .list_coupons(&token.access_token, location_id.trim())
                .await
            {
                Ok(found) => {
                    coupons = found;
                    coupons_checked = true;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "coupon lookup failed; continuing without coupons");
                }
            },
            Err(error) => {
                tracing::debug!(error = %error, "no usable user credential; skipping coupons");
            }
        }
    }

    let attribution = attribute(&request.ingredients, &deals, &coupons);

    Ok(Json(ApiResponse {
        data: SavingsView {
            attribution,
            coupons_checked,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub struct SavedRecipeView {
    pub id: i64,
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Value,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

impl From<cartwise_db::SavedRecipeRow> for SavedRecipeView {
    fn from(row: cartwise_db::SavedRecipeRow) -> Self {
        Self {
            id: row.id,
            recipe_id: row.recipe_id,
            title: row.title,
            image_url: row.image_url,
            source_url: row.source_url,
            ingredients: row.ingredients,
            saved_at: row.saved_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRecipeRequest {
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub ingredients: Value,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// GET /api/v1/recipes/saved
pub async fn list_saved(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<Vec<SavedRecipeView>>>, ApiError> {
    let rows = cartwise_db::list_saved_recipes(&state.pool, &user.0)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SavedRecipeView::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/recipes/saved
pub async fn save_recipe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<SaveRecipeRequest>,
) -> Result<Json<ApiResponse<SavedRecipeView>>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "'title' must not be empty",
        ));
    }

    let ingredients = if request.ingredients.is_null() {
        Value::Array(vec![])
    } else {
        request.ingredients
    };
    let new_recipe = NewSavedRecipe {
        recipe_id: request.recipe_id,
        title: request.title,
        image_url: request.image_url,
        source_url: request.source_url,
        ingredients,
    };
    let row = cartwise_db::insert_saved_recipe(&state.pool, &user.0, &new_recipe)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/recipes/saved/{id}
pub async fn delete_saved(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteResult>>, ApiError> {
    cartwise_db::delete_saved_recipe(&state.pool, &user.0, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeleteResult { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
