//! HTTP client for the retail partner catalog, loyalty, and cart APIs.
//!
//! Wraps `reqwest` with Bearer authentication and typed response
//! deserialization. Non-2xx responses surface the upstream error text as
//! [`RetailError::Api`] so the HTTP layer can pass it through to callers.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::json;
use url::Url;

use crate::error::RetailError;
use crate::types::{
    CartItem, CouponRecord, DataEnvelope, IdentityProfile, LocationRecord, ObjectEnvelope,
    ProductRecord,
};

/// Client for the retail partner REST API.
///
/// Manages the HTTP client and base URL. Use [`RetailClient::new`] for
/// production or [`RetailClient::with_base_url`] to point at a mock server
/// in tests.
pub struct RetailClient {
    client: Client,
    base_url: Url,
}

impl RetailClient {
    /// Creates a new client for the given partner base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RetailError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RetailError> {
        Self::with_base_url(base_url, timeout_secs)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`RetailClient::new`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, RetailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cartwise/0.1 (deal-aggregation)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join treats it as a directory rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RetailError::Api {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self { client, base_url })
    }

    /// Searches store locations near a zip code.
    ///
    /// # Errors
    ///
    /// - [`RetailError::Api`] on a non-2xx upstream status.
    /// - [`RetailError::Http`] on network failure.
    /// - [`RetailError::Deserialize`] if the response shape is unexpected.
    pub async fn locations_by_zip(
        &self,
        token: &str,
        zip: &str,
        limit: u32,
    ) -> Result<Vec<LocationRecord>, RetailError> {
        let url = self.build_url(
            "v1/locations",
            &[
                ("filter.zipCode.near", zip),
                ("filter.limit", &limit.to_string()),
            ],
        )?;
        let envelope: DataEnvelope<LocationRecord> =
            self.request_json(Method::GET, url, token, None).await?;
        Ok(envelope.data)
    }

    /// Searches the catalog for products matching `term` at a store location.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::locations_by_zip`].
    pub async fn search_products(
        &self,
        token: &str,
        location_id: &str,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ProductRecord>, RetailError> {
        let url = self.build_url(
            "v1/products",
            &[
                ("filter.locationId", location_id),
                ("filter.term", term),
                ("filter.limit", &limit.to_string()),
            ],
        )?;
        let envelope: DataEnvelope<ProductRecord> =
            self.request_json(Method::GET, url, token, None).await?;
        Ok(envelope.data)
    }

    /// Lists the digital coupons available to the authenticated user at a
    /// store location.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::locations_by_zip`].
    pub async fn list_coupons(
        &self,
        token: &str,
        location_id: &str,
    ) -> Result<Vec<CouponRecord>, RetailError> {
        let url = self.build_url("v1/savings/coupons", &[("filter.locationId", location_id)])?;
        let envelope: DataEnvelope<CouponRecord> =
            self.request_json(Method::GET, url, token, None).await?;
        Ok(envelope.data)
    }

    /// Clips a digital coupon onto the authenticated user's loyalty card.
    ///
    /// # Errors
    ///
    /// - [`RetailError::Api`] on a non-2xx upstream status.
    /// - [`RetailError::Http`] on network failure.
    pub async fn clip_coupon(&self, token: &str, coupon_id: &str) -> Result<(), RetailError> {
        let url = self.build_url("v1/savings/coupons/clip", &[])?;
        self.request_empty(
            Method::PUT,
            url,
            token,
            Some(json!({ "couponId": coupon_id })),
        )
        .await
    }

    /// Adds items to the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::clip_coupon`].
    pub async fn add_to_cart(&self, token: &str, items: &[CartItem]) -> Result<(), RetailError> {
        let url = self.build_url("v1/cart/add", &[])?;
        self.request_empty(Method::PUT, url, token, Some(json!({ "items": items })))
            .await
    }

    /// Fetches the authenticated user's partner identity. The returned id is
    /// the key under which profile rows and credentials are stored.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::locations_by_zip`].
    pub async fn identity_profile(&self, token: &str) -> Result<String, RetailError> {
        let url = self.build_url("v1/identity/profile", &[])?;
        let envelope: ObjectEnvelope<IdentityProfile> =
            self.request_json(Method::GET, url, token, None).await?;
        Ok(envelope.data.id)
    }

    /// Builds the full request URL with properly percent-encoded query parameters.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, RetailError> {
        let mut url = self.base_url.join(path).map_err(|e| RetailError::Api {
            status: 0,
            body: format!("invalid request path '{path}': {e}"),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a Bearer-authenticated request and parses the body as JSON.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, RetailError> {
        let text = self.send_checked(method, url.clone(), token, body).await?;
        serde_json::from_str(&text).map_err(|e| RetailError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Sends a Bearer-authenticated request, discarding any response body.
    async fn request_empty(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), RetailError> {
        self.send_checked(method, url, token, body).await?;
        Ok(())
    }

    /// Sends the request and asserts a 2xx status, returning the body text.
    /// Non-2xx statuses carry the upstream body in [`RetailError::Api`].
    async fn send_checked(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, RetailError> {
        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RetailError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}
