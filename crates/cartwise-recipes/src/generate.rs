//! Passthrough client for the LLM completion API.
//!
//! The request body is forwarded verbatim and the upstream response —
//! status code included — is handed back untouched so the HTTP layer can
//! relay it to the caller.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::RecipesError;

const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Client for the LLM completion endpoint.
pub struct LlmClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl LlmClient {
    /// Creates a new client for the given provider base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RecipesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RecipesError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, RecipesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cartwise/0.1 (deal-aggregation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RecipesError::Api {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// POSTs `body` to the completion endpoint and returns the upstream
    /// status code and JSON body verbatim. Non-2xx statuses are returned,
    /// not raised — the caller relays them as-is.
    ///
    /// # Errors
    ///
    /// - [`RecipesError::Http`] on network failure.
    /// - [`RecipesError::Deserialize`] if the response body is not JSON.
    pub async fn complete(&self, body: &Value) -> Result<(u16, Value), RecipesError> {
        let url = self
            .base_url
            .join(COMPLETIONS_PATH)
            .map_err(|e| RecipesError::Api {
                status: 0,
                body: format!("invalid completions URL: {e}"),
            })?;

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| RecipesError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Ok((status, parsed))
    }
}
