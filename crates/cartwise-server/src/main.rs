mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cartwise_recipes::{LlmClient, RecipeSearchClient};
use cartwise_retail::{MemoryCredentialStore, RetailClient, TokenClient, TokenManager};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::SiteGate,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(cartwise_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = cartwise_db::PoolConfig::from_app_config(&config);
    let pool = cartwise_db::connect_pool(&config.database_url, pool_config).await?;
    cartwise_db::run_migrations(&pool).await?;

    let retail = Arc::new(RetailClient::new(
        &config.retail_base_url,
        config.http_timeout_secs,
    )?);
    let oauth = TokenClient::new(
        &config.retail_base_url,
        &config.retail_client_id,
        &config.retail_client_secret,
        &config.retail_redirect_uri,
        config.http_timeout_secs,
    )?;
    let tokens = Arc::new(TokenManager::new(oauth, MemoryCredentialStore::new()));
    let recipes = Arc::new(RecipeSearchClient::new(
        &config.recipes_base_url,
        config.recipes_api_key.as_deref().unwrap_or_default(),
        config.http_timeout_secs,
    )?);
    let llm = Arc::new(LlmClient::new(
        &config.llm_base_url,
        config.llm_api_key.as_deref().unwrap_or_default(),
        config.http_timeout_secs,
    )?);

    let gate = SiteGate::new(
        config.site_secret.clone(),
        matches!(config.env, cartwise_core::Environment::Development),
    )?;
    let state = AppState {
        pool,
        retail,
        tokens,
        recipes,
        llm,
        config: Arc::clone(&config),
    };
    let app = build_app(state, gate, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
