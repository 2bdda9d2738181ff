use thiserror::Error;

/// Errors returned by the recipe-search and LLM clients.
#[derive(Debug, Error)]
pub enum RecipesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API returned a non-success status; the body is carried
    /// verbatim so it can be surfaced to the caller.
    #[error("recipe API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
