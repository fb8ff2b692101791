use brandintel_core::{RecordKind, ValidationError};
use thiserror::Error;

/// Errors returned by the database gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No row matches the requested identifier.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },

    /// The record was rejected before or by the database as malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The database was unreachable or failed the request.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Service(ServiceError::Http(e))
    }
}

/// Failures of the hosted database service itself. Messages are meant for
/// logs, not for API clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The database answered with a non-success status.
    #[error("database rejected {table} request with status {status}: {message}")]
    Rejected {
        table: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body did not match the expected row shape.
    #[error("could not decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The gateway could not be constructed from its configuration.
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}
