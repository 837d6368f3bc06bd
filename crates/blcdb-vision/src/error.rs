use thiserror::Error;

/// Errors returned by the vision classification client.
#[derive(Debug, Error)]
pub enum VisionError {
    /// No API key was configured; the feature is disabled.
    #[error("vision API key is not configured")]
    MissingApiKey,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error envelope or an unusable candidate set.
    #[error("vision API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
