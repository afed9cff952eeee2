use thiserror::Error;

/// Errors returned by the geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client, or a non-2xx
    /// HTTP status from the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid geocoder base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A result's `lat`/`lon` string field was not a valid number.
    #[error("unparseable coordinate '{value}' in geocoding result")]
    Coordinates { value: String },
}
