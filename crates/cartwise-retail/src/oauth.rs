//! OAuth token acquisition and refresh against the retail partner's
//! token endpoint.
//!
//! [`TokenClient`] speaks the wire protocol (form-encoded grants with Basic
//! client auth); [`TokenManager`] layers the if-expired-then-fetch policy on
//! top of a [`CredentialStore`]. There is no retry and no locking: concurrent
//! callers for the same key may both refresh, which the provider treats as
//! idempotent.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::credentials::{Credential, CredentialStore, ScopeKind};
use crate::error::RetailError;

const TOKEN_PATH: &str = "v1/connect/oauth2/token";
const AUTHORIZE_PATH: &str = "v1/connect/oauth2/authorize";

/// Scope requested for application-level (client-credentials) tokens.
const APP_SCOPES: &str = "product.compact";
/// Scope requested when a user authorizes via the browser flow.
const USER_SCOPES: &str = "product.compact cart.basic:write coupon.basic:write profile.compact";

/// Store key for the application-level credential.
pub const APP_CREDENTIAL_KEY: &str = "app";

/// Store key for a user-level credential.
#[must_use]
pub fn user_credential_key(user_id: &str) -> String {
    format!("user:{user_id}")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Client for the partner's OAuth token and authorize endpoints.
pub struct TokenClient {
    client: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl TokenClient {
    /// Creates a token client for the given partner base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RetailError::Auth`] if `base_url` is not
    /// a valid URL.
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        timeout_secs: u64,
    ) -> Result<Self, RetailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cartwise/0.1 (deal-aggregation)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join treats it as a directory rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RetailError::Auth {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            base_url,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
        })
    }

    /// Builds the browser-redirect authorize URL for the user OAuth flow.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError::Auth`] if the authorize path cannot be joined
    /// onto the base URL (malformed base URL).
    pub fn authorize_url(&self, state: &str) -> Result<Url, RetailError> {
        let mut url = self.base_url.join(AUTHORIZE_PATH).map_err(|e| RetailError::Auth {
            status: 0,
            body: format!("invalid authorize URL: {e}"),
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", USER_SCOPES)
            .append_pair("state", state);
        Ok(url)
    }

    /// Performs the client-credentials grant, yielding an app-level credential.
    ///
    /// # Errors
    ///
    /// - [`RetailError::Auth`] if the token endpoint returns a non-2xx status.
    /// - [`RetailError::Http`] on network failure.
    /// - [`RetailError::Deserialize`] if the response shape is unexpected.
    pub async fn client_credentials_grant(&self) -> Result<Credential, RetailError> {
        self.request_token(
            &[("grant_type", "client_credentials"), ("scope", APP_SCOPES)],
            ScopeKind::App,
        )
        .await
    }

    /// Exchanges a browser-flow authorization code for a user credential.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::client_credentials_grant`].
    pub async fn authorization_code_grant(&self, code: &str) -> Result<Credential, RetailError> {
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ],
            ScopeKind::User,
        )
        .await
    }

    /// Performs the refresh-token grant for an expired user credential.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::client_credentials_grant`].
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<Credential, RetailError> {
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            ScopeKind::User,
        )
        .await
    }

    /// POSTs the form-encoded grant with Basic client auth and converts the
    /// response into a [`Credential`] with an absolute expiry timestamp.
    async fn request_token(
        &self,
        params: &[(&str, &str)],
        scope_kind: ScopeKind,
    ) -> Result<Credential, RetailError> {
        let url = self.base_url.join(TOKEN_PATH).map_err(|e| RetailError::Auth {
            status: 0,
            body: format!("invalid token URL: {e}"),
        })?;

        let response = self
            .client
            .post(url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                grant_type = params.first().map_or("", |(_, v)| v),
                "token endpoint rejected the grant"
            );
            return Err(RetailError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| RetailError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        Ok(Credential {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_at_ms: Utc::now().timestamp_millis() + parsed.expires_in * 1_000,
            scope_kind,
        })
    }
}

/// If-expired-then-fetch token management over a [`CredentialStore`].
pub struct TokenManager {
    oauth: TokenClient,
    store: Arc<dyn CredentialStore>,
}

impl TokenManager {
    pub fn new(oauth: TokenClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { oauth, store }
    }

    pub fn oauth(&self) -> &TokenClient {
        &self.oauth
    }

    /// Returns a valid application-level access token, fetching a fresh one
    /// via the client-credentials grant when the stored token is absent or
    /// expired. A stored token with a future expiry is returned unchanged
    /// without any token-endpoint call.
    ///
    /// # Errors
    ///
    /// Propagates [`RetailError::Auth`], [`RetailError::Http`], or
    /// [`RetailError::Deserialize`] from the grant.
    pub async fn ensure_app_token(&self) -> Result<Credential, RetailError> {
        let now_ms = Utc::now().timestamp_millis();
        if let Some(credential) = self.store.get(APP_CREDENTIAL_KEY).await {
            if credential.is_valid_at(now_ms) {
                return Ok(credential);
            }
        }

        let fresh = self.oauth.client_credentials_grant().await?;
        self.store.set(APP_CREDENTIAL_KEY, fresh.clone()).await;
        Ok(fresh)
    }

    /// Returns a valid user-level access token for `user_id`.
    ///
    /// An absent credential means the user has not completed the browser
    /// OAuth flow on this process; an expired credential without a refresh
    /// token is dropped and treated the same way.
    ///
    /// # Errors
    ///
    /// - [`RetailError::MissingCredential`] if no usable credential exists.
    /// - [`RetailError::Auth`] if the refresh grant is rejected.
    /// - [`RetailError::Http`] / [`RetailError::Deserialize`] from the grant.
    pub async fn ensure_user_token(&self, user_id: &str) -> Result<Credential, RetailError> {
        let key = user_credential_key(user_id);
        let Some(credential) = self.store.get(&key).await else {
            return Err(RetailError::MissingCredential(key));
        };

        let now_ms = Utc::now().timestamp_millis();
        if credential.is_valid_at(now_ms) {
            return Ok(credential);
        }

        let Some(refresh_token) = credential.refresh_token.as_deref() else {
            tracing::debug!(key = %key, "expired credential has no refresh token; dropping it");
            self.store.delete(&key).await;
            return Err(RetailError::MissingCredential(key));
        };

        let refreshed = self.oauth.refresh_grant(refresh_token).await?;
        self.store.set(&key, refreshed.clone()).await;
        Ok(refreshed)
    }

    /// Stores the credential produced by the authorization-code grant.
    pub async fn store_user_credential(&self, user_id: &str, credential: Credential) {
        self.store
            .set(&user_credential_key(user_id), credential)
            .await;
    }

    /// Drops a user's credential, forcing re-authentication.
    pub async fn drop_user_credential(&self, user_id: &str) {
        self.store.delete(&user_credential_key(user_id)).await;
    }
}
