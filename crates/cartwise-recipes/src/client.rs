//! HTTP client for the recipe-search API.
//!
//! Thin wrapper around the provider's `complexSearch` endpoint with the
//! API key passed as a query parameter. Only the fields the application
//! reads are typed; everything else is ignored on deserialization.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RecipesError;

const SEARCH_PATH: &str = "recipes/complexSearch";

/// Structured filters for a recipe search.
#[derive(Debug, Clone, Default)]
pub struct RecipeSearchParams {
    /// Comma-separated ingredient names the recipes should use.
    pub include_ingredients: Option<String>,
    /// Dish type, e.g. `"main course"`.
    pub recipe_type: Option<String>,
    /// Diet filter, e.g. `"vegetarian"`.
    pub diet: Option<String>,
    pub max_calories: Option<u32>,
    pub min_fiber: Option<u32>,
    /// Number of results to request (provider default when unset).
    pub number: Option<u32>,
}

/// One recipe from the search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub nutrition: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RecipeSummary>,
}

/// Client for the recipe-search REST API.
pub struct RecipeSearchClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RecipeSearchClient {
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

    /// Searches recipes with the given structured filters.
    ///
    /// # Errors
    ///
    /// - [`RecipesError::Api`] on a non-2xx upstream status.
    /// - [`RecipesError::Http`] on network failure.
    /// - [`RecipesError::Deserialize`] if the response shape is unexpected.
    pub async fn search(
        &self,
        params: &RecipeSearchParams,
    ) -> Result<Vec<RecipeSummary>, RecipesError> {
        let url = self.build_search_url(params)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RecipesError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| RecipesError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Ok(parsed.results)
    }

    fn build_search_url(&self, params: &RecipeSearchParams) -> Result<Url, RecipesError> {
        let mut url = self.base_url.join(SEARCH_PATH).map_err(|e| RecipesError::Api {
            status: 0,
            body: format!("invalid search URL: {e}"),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apiKey", &self.api_key);
            if let Some(v) = &params.include_ingredients {
                pairs.append_pair("includeIngredients", v);
            }
            if let Some(v) = &params.recipe_type {
                pairs.append_pair("type", v);
            }
            if let Some(v) = &params.diet {
                pairs.append_pair("diet", v);
            }
            if let Some(v) = params.max_calories {
                pairs.append_pair("maxCalories", &v.to_string());
            }
            if let Some(v) = params.min_fiber {
                pairs.append_pair("minFiber", &v.to_string());
            }
            if let Some(v) = params.number {
                pairs.append_pair("number", &v.to_string());
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_includes_only_set_filters() {
        let client = RecipeSearchClient::new("https://api.spoonacular.com", "k", 30)
            .expect("client construction should not fail");
        let url = client
            .build_search_url(&RecipeSearchParams {
                include_ingredients: Some("chicken,rice".to_owned()),
                diet: Some("vegetarian".to_owned()),
                max_calories: Some(600),
                ..RecipeSearchParams::default()
            })
            .expect("url");
        let rendered = url.as_str();
        assert!(rendered.starts_with("https://api.spoonacular.com/recipes/complexSearch?apiKey=k"));
        assert!(rendered.contains("includeIngredients=chicken%2Crice"));
        assert!(rendered.contains("diet=vegetarian"));
        assert!(rendered.contains("maxCalories=600"));
        assert!(!rendered.contains("minFiber"));
        assert!(!rendered.contains("type="));
    }
}
