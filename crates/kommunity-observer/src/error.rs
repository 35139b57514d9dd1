//! Error types for the observer.
//!
//! [`ObserverError`] converts into an Axum response carrying a JSON body of
//! the form `{"error": ..., "status": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kommunity_store::StoreError;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested topic does not exist or could not be read.
    #[error("topic not found: {0}")]
    NotFound(String),

    /// The requested path is malformed or leaves the store root.
    #[error("invalid topic path: {0}")]
    BadPath(String),

    /// A page template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ObserverError {
    /// Map a failed single-topic lookup.
    ///
    /// Path errors are the caller's fault (400). Anything else, including a
    /// record that exists but does not parse, reads as "no such topic".
    pub fn from_lookup(location: &str, err: StoreError) -> Self {
        match err {
            StoreError::PathEscape(p) | StoreError::InvalidPath(p) => Self::BadPath(p),
            other => {
                tracing::debug!(location, error = %other, "topic lookup failed");
                Self::NotFound(location.to_owned())
            }
        }
    }
}

impl From<StoreError> for ObserverError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PathEscape(p) | StoreError::InvalidPath(p) => Self::BadPath(p),
            e if e.is_not_found() => Self::NotFound(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadPath(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn escape_maps_to_bad_request() {
        let err = ObserverError::from_lookup("../x", StoreError::PathEscape("../x".to_owned()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreadable_record_maps_to_not_found() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ObserverError::from_lookup("a.json", StoreError::Serialization(parse));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
