//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ErrorDetail;

/// Common error type for catalog API operations.
///
/// Every failure of a catalog request is reported as one of these variants.
/// Consumers store the rendered message rather than the error itself.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// Connection, timeout or transport failures.
    #[error("could not reach the catalog")]
    Network(#[source] reqwest::Error),

    /// The response was received but could not be interpreted.
    #[error("could not decode catalog response")]
    Decode(#[from] DecodeError),

    /// The server rejected the credentials of the request (401/403).
    #[error("{}", fmt_status(.status, .detail.as_deref(), "not authorized"))]
    Auth {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The requested resource does not exist.
    #[error("{}", fmt_status(&StatusCode::NOT_FOUND, .detail.as_deref(), "not found"))]
    NotFound { detail: Option<String> },

    /// The server rejected the body of a mutation.
    #[error("{status}: {detail}")]
    Validation {
        status: StatusCode,
        detail: ErrorDetail,
    },

    /// Any other non-success status.
    #[error("{}", fmt_status(.status, .detail.as_deref(), "request failed"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The client could not be constructed from its configuration.
    #[error("invalid catalog client configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogClientError {
    /// Classify a non-success status and the `detail` of its body.
    ///
    /// Structured validation errors are only reported for mutations,
    /// other requests report them as plain status errors.
    pub fn from_status(status: StatusCode, detail: Option<ErrorDetail>, mutation: bool) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CatalogClientError::Auth {
                status,
                detail: detail.map(|detail| detail.to_string()),
            },
            StatusCode::NOT_FOUND => CatalogClientError::NotFound {
                detail: detail.map(|detail| detail.to_string()),
            },
            status if status.is_client_error() && mutation => match detail {
                Some(detail) => CatalogClientError::Validation { status, detail },
                None => CatalogClientError::Status {
                    status,
                    detail: None,
                },
            },
            status => CatalogClientError::Status {
                status,
                detail: detail.map(|detail| detail.to_string()),
            },
        }
    }

    /// Whether this error means the caller's session is not (or no longer) valid.
    pub fn is_auth(&self) -> bool {
        matches!(self, CatalogClientError::Auth { .. })
    }

    /// The server provided `detail` message, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            CatalogClientError::Auth { detail, .. }
            | CatalogClientError::NotFound { detail }
            | CatalogClientError::Status { detail, .. } => detail.clone(),
            CatalogClientError::Validation { detail, .. } => Some(detail.to_string()),
            _ => None,
        }
    }
}

/// Errors interpreting a response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON")]
    Json(#[source] serde_json::Error),

    #[error("response is neither an 'items' nor a 'data' page")]
    UnknownEnvelope,

    #[error("malformed '{shape}' page")]
    Envelope {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response body")]
    Body(#[source] serde_json::Error),
}

fn fmt_status(status: &StatusCode, detail: Option<&str>, fallback: &str) -> String {
    match detail {
        Some(detail) => format!("{status}: {detail}"),
        None => format!("{status}: {fallback}"),
    }
}
