use thiserror::Error;

/// Errors returned by the retail partner API clients.
#[derive(Debug, Error)]
pub enum RetailError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint returned a non-success status.
    #[error("token endpoint returned {status}: {body}")]
    Auth { status: u16, body: String },

    /// A catalog/loyalty/cart endpoint returned a non-success status.
    /// The upstream error text is carried verbatim so callers can surface it.
    #[error("retail API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No credential is stored for the given key; the caller must
    /// re-authenticate. Maps to 401 at the HTTP surface.
    #[error("no stored credential for {0}")]
    MissingCredential(String),
}
