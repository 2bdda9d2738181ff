//! Offline unit tests for cartwise-db pool configuration and row types.
//! These tests do not require a live database connection.

use cartwise_core::{AppConfig, Environment};
use cartwise_db::{NewSavedRecipe, PoolConfig, ProfileRow, ProfileUpdate, SavedRecipeRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn test_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        retail_base_url: "https://api.kroger.com".to_string(),
        retail_client_id: "client".to_string(),
        retail_client_secret: "secret".to_string(),
        retail_redirect_uri: "http://localhost:3000/auth/callback".to_string(),
        recipes_base_url: "https://api.spoonacular.com".to_string(),
        recipes_api_key: None,
        llm_base_url: "https://api.openai.com".to_string(),
        llm_api_key: None,
        site_secret: None,
        http_timeout_secs: 30,
        deals_batch_size: 8,
        deals_cap: 200,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&test_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ProfileRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn profile_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProfileRow {
        user_id: "partner-user-1".to_string(),
        display_name: Some("Sam".to_string()),
        home_zip: Some("45202".to_string()),
        preferred_location_id: Some("01400943".to_string()),
        dietary_preferences: serde_json::json!(["vegetarian"]),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.user_id, "partner-user-1");
    assert_eq!(row.home_zip.as_deref(), Some("45202"));
    assert_eq!(row.dietary_preferences[0], "vegetarian");
}

#[test]
fn profile_update_defaults_to_all_none() {
    let update = ProfileUpdate::default();
    assert!(update.display_name.is_none());
    assert!(update.home_zip.is_none());
    assert!(update.preferred_location_id.is_none());
    assert!(update.dietary_preferences.is_none());
}

/// Compile-time smoke test for [`SavedRecipeRow`] and [`NewSavedRecipe`].
#[test]
fn saved_recipe_types_have_expected_fields() {
    use chrono::Utc;

    let new = NewSavedRecipe {
        recipe_id: 715_538,
        title: "Bruschetta Style Pork & Pasta".to_string(),
        image_url: Some("https://img.example.com/715538.jpg".to_string()),
        source_url: None,
        ingredients: serde_json::json!(["pork tenderloin", "penne", "tomatoes"]),
    };
    let row = SavedRecipeRow {
        id: 1,
        user_id: "partner-user-1".to_string(),
        recipe_id: new.recipe_id,
        title: new.title.clone(),
        image_url: new.image_url.clone(),
        source_url: new.source_url.clone(),
        ingredients: new.ingredients.clone(),
        saved_at: Utc::now(),
    };

    assert_eq!(row.recipe_id, 715_538);
    assert_eq!(row.ingredients.as_array().map(Vec::len), Some(3));
}
