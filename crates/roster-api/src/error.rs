//! Error types for the API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The body
//! is always `{"error": <message>, "status": <code>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use roster_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write was rejected by a uniqueness or reference constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The database could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// An ID could not be parsed from the request path.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// The request body could not be decoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The request body failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The dashboard template failed to render.
    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidId(_) | Self::InvalidBody(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Render(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::ConstraintViolation(msg) => Self::Conflict(msg),
            DbError::Connectivity(msg) => Self::Unavailable(msg),
            DbError::Decode(_) | DbError::Query(_) | DbError::Config(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Unavailable(msg)
            | Self::InvalidId(msg)
            | Self::InvalidBody(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Validation(_) | Self::Render(_) => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_distinct_statuses() {
        let cases = [
            (DbError::NotFound(String::from("x")), StatusCode::NOT_FOUND),
            (
                DbError::ConstraintViolation(String::from("x")),
                StatusCode::CONFLICT,
            ),
            (
                DbError::Connectivity(String::from("x")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DbError::Decode(String::from("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DbError::Config(String::from("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (db, expected) in cases {
            assert_eq!(ApiError::from(db).status(), expected);
        }
    }

    #[test]
    fn invalid_id_is_bad_request() {
        let response = ApiError::InvalidId(String::from("nope")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
