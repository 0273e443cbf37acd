use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;

/// Everything a request can fail with, grouped by how it maps onto the
/// wire: auth failures carry generic messages, validation failures carry
/// a specific per-field message, store failures never leak diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Username and password are required")]
    MissingCredentials,
    // Deliberately does not say which of the two fields was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Authorization token is required")]
    MissingToken,
    // Expired and malformed tokens are indistinguishable to the caller
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Route not found")]
    RouteNotFound,
    #[error("Internal server error")]
    Store(#[source] anyhow::Error),
}

/// Field-level patient validation failures, one per check in the fixed
/// validation order. The first violated rule short-circuits the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    InvalidName,
    #[error("Age must be a whole number between 1 and 150")]
    InvalidAge,
    #[error("Gender must be one of Male, Female or Other")]
    InvalidGender,
    #[error("Village is required")]
    InvalidVillage,
    #[error("Health issue is required")]
    InvalidHealthIssue,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MissingToken | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(source) = &self {
            // Full diagnostics go to the log; the caller gets the generic message
            tracing::error!("record store failure: {source:#}");
        }

        let details = match &self {
            ApiError::Validation(violation) => Some(vec![violation.to_string()]),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            details,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
