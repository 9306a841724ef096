//! Request-level error taxonomy.
//!
//! Every boundary operation converts its failures into an [`ApiError`],
//! which maps onto an HTTP status and a human-readable message. Store and
//! I/O failures are logged with their details and surfaced as a generic
//! internal error; no error is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application error carried through handlers and extractors.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// Bad credentials or a bad token.
    Authentication,
    /// Authenticated, but the wrong role.
    Authorization,
    /// Missing entity.
    NotFound,
    /// Duplicate unique key.
    Conflict,
    /// Store or I/O failure.
    Internal,
}

impl ErrorKind {
    // ---
    /// HTTP status for this kind. Conflicts map to 400 rather than 409:
    /// duplicate registration is reported as a bad request.
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    // ---
    pub fn validation(message: impl Into<String>) -> Self {
        // ---
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        // ---
        Self {
            kind: ErrorKind::Authentication,
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        // ---
        Self {
            kind: ErrorKind::Authorization,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        // ---
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        // ---
        Self {
            kind: ErrorKind::Conflict,
            message: message.into(),
        }
    }

    /// Internal error: logs the details, responds with a generic message.
    pub fn internal(details: impl Into<String>) -> Self {
        // ---
        let details = details.into();
        tracing::error!("internal error: {details}");
        Self {
            kind: ErrorKind::Internal,
            message: "internal server error".into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        // ---
        self.kind
    }

    pub fn message(&self) -> &str {
        // ---
        &self.message
    }
}

/// Wire shape of every failure response.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.kind.status();
        let body = ErrorBody {
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

// Repository failures surface as internal errors with their details
// logged but not exposed.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // ---
        ApiError::internal(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn kinds_map_to_expected_statuses() {
        // ---
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Authorization.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        // Duplicate unique key is a bad request on this API, not a 409.
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_hides_details() {
        // ---
        let err = ApiError::internal("connection pool exhausted");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn repository_errors_convert_to_internal() {
        // ---
        let err: ApiError = anyhow::anyhow!("row decode failed").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
