//! Browser OAuth flow against the retail partner.
//!
//! `/auth/login` redirects the browser to the partner's authorize page;
//! `/auth/callback` exchanges the returned code for a user credential,
//! resolves the partner identity, and sets the session cookie.

use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{RequestId, SESSION_COOKIE};

use super::{map_retail_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    #[allow(dead_code)]
    pub state: Option<String>,
}

/// GET /auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let oauth_state = Uuid::new_v4().to_string();
    let url = state
        .tokens
        .oauth()
        .authorize_url(&oauth_state)
        .map_err(|e| map_retail_error(req_id.0, &e))?;
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /auth/callback?code=...&state=...
pub async fn callback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return Err(ApiError::new(
            req_id.0,
            "missing_parameter",
            "required parameter 'code' is absent",
        ));
    };

    let credential = state
        .tokens
        .oauth()
        .authorization_code_grant(code)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    let user_id = state
        .retail
        .identity_profile(&credential.access_token)
        .await
        .map_err(|e| map_retail_error(req_id.0.clone(), &e))?;

    state.tokens.store_user_credential(&user_id, credential).await;
    tracing::info!(user_id = %user_id, "user completed partner authorization");

    let cookie = format!("{SESSION_COOKIE}={user_id}; Path=/; HttpOnly; SameSite=Lax");
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")))
}
