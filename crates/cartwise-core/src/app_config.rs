use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub retail_base_url: String,
    pub retail_client_id: String,
    pub retail_client_secret: String,
    pub retail_redirect_uri: String,
    pub recipes_base_url: String,
    pub recipes_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    /// Shared secret expected in the `cw_site` cookie. When unset in
    /// development the gate is disabled for local iteration.
    pub site_secret: Option<String>,
    pub http_timeout_secs: u64,
    pub deals_batch_size: usize,
    pub deals_cap: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("retail_base_url", &self.retail_base_url)
            .field("retail_client_id", &self.retail_client_id)
            .field("retail_client_secret", &"[redacted]")
            .field("retail_redirect_uri", &self.retail_redirect_uri)
            .field("recipes_base_url", &self.recipes_base_url)
            .field(
                "recipes_api_key",
                &self.recipes_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "site_secret",
                &self.site_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("deals_batch_size", &self.deals_batch_size)
            .field("deals_cap", &self.deals_cap)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
