use serde::Deserialize;
use thiserror::Error;

/// One offending field reported by the API on a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiFieldError {
    pub field: String,
    pub message: String,
}

/// Errors returned by the dashboard's API client.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error envelope.
    #[error("{code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        fields: Vec<ApiFieldError>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("could not decode {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
